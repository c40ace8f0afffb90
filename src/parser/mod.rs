/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Tokenless PEG recognizer over source text. Each line is parsed
//! independently against the grammar in §4.1: an optional label, then
//! either an instruction or nothing, or a directive, or a blank/comment
//! line. Errors accumulate across the whole file; within a line, the
//! first hard error aborts only that line.

pub mod lexer;
pub mod mnemonics;
pub mod operands;

use std::path::Path;
use std::sync::Arc;

use crate::ast::{
    DirectiveKind, DirectiveStmt, InstructionStmt, LabelStmt, Mnemonic, Operand, OperandKind,
    Program, SourcePos, Statement,
};
use crate::errors::{AssemblyError, ErrorList};
use crate::file_reader::FileReader;

use lexer::{match_literal, scan_identifier, skip_ws};
use operands::ParseState;

pub fn parse_file(reader: &dyn FileReader, path: &Path) -> Result<Program, ErrorList> {
    let source = reader
        .read_to_string(path)
        .map_err(|e| ErrorList::from(AssemblyError::SemanticNoLine { reason: e.to_string() }))?;
    let filename = path.display().to_string();
    parse_str(&source, &filename)
}

pub fn parse_str(source: &str, filename: &str) -> Result<Program, ErrorList> {
    let file: Arc<str> = Arc::from(filename);
    let mut program = Program::new();
    let mut errors = ErrorList::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        log::debug!("{filename}:{line_no}: parsing line");
        let ps = ParseState::new(raw_line, file.clone(), line_no);
        match parse_line(&ps) {
            Ok(stmts) => program.extend(stmts),
            Err(err) => errors.push(err),
        }
    }

    errors.into_result(program)
}

fn is_line_done(text: &str, pos: usize) -> bool {
    let p = skip_ws(text, pos);
    p >= text.len() || text.as_bytes()[p] == b';'
}

fn trailing_error(ps: &ParseState, pos: usize) -> AssemblyError {
    AssemblyError::Syntax { pos: ps.pos_at(pos), expected: "end of line".to_string() }
}

fn farthest_error(ps: &ParseState, fallback_pos: usize, fallback: &str) -> AssemblyError {
    match ps.farthest_failure() {
        Some((pos, what)) => AssemblyError::Syntax { pos: ps.pos_at(pos), expected: what },
        None => AssemblyError::Syntax { pos: ps.pos_at(fallback_pos), expected: fallback.to_string() },
    }
}

/// Parse one physical line into zero, one, or two statements (a label may
/// share a line with the instruction it precedes; each still becomes its
/// own `Statement` so the layouter's address bookkeeping stays uniform).
fn parse_line(ps: &ParseState) -> Result<Vec<Statement>, AssemblyError> {
    let start = skip_ws(ps.text, 0);
    if is_line_done(ps.text, start) {
        return Ok(Vec::new());
    }

    if let Some((name, after_colon)) = try_label(ps.text, start) {
        let label_pos = ps.pos_at(start);
        ps.clear_expects();
        let after = skip_ws(ps.text, after_colon);
        if is_line_done(ps.text, after) {
            return Ok(vec![Statement::Label(LabelStmt { name, addr: None, pos: label_pos })]);
        }
        let instr = parse_instruction(ps, after)?;
        return Ok(vec![
            Statement::Label(LabelStmt { name, addr: None, pos: label_pos }),
            Statement::Instruction(instr),
        ]);
    }

    if ps.text.as_bytes().get(start) == Some(&b'.') {
        return parse_directive(ps, start).map(|s| vec![s]);
    }

    parse_instruction(ps, start).map(|i| vec![Statement::Instruction(i)])
}

fn try_label(text: &str, pos: usize) -> Option<(String, usize)> {
    let (ident, end) = scan_identifier(text, pos)?;
    let p = skip_ws(text, end);
    let colon = match_literal(text, p, ":")?;
    Some((ident.to_string(), colon))
}

fn parse_instruction(ps: &ParseState, start: usize) -> Result<InstructionStmt, AssemblyError> {
    let pos = ps.pos_at(start);
    let (ident, after) = scan_identifier(ps.text, start)
        .ok_or_else(|| farthest_error(ps, start, "a mnemonic or directive"))?;
    let mnemonic = Mnemonic::from_name(&ident.to_ascii_lowercase())
        .ok_or_else(|| AssemblyError::Syntax { pos: pos.clone(), expected: format!("unknown mnemonic '{ident}'") })?;

    let operand_start = skip_ws(ps.text, after);
    ps.clear_expects();
    let (operands, end) = mnemonics::dispatch(ps, operand_start, mnemonic)
        .ok_or_else(|| farthest_error(ps, operand_start, "a valid operand list"))?;

    if !is_line_done(ps.text, end) {
        return Err(trailing_error(ps, end));
    }

    Ok(InstructionStmt { mnemonic, operands, length: 0, addr: None, bytes: Vec::new(), pos })
}

fn parse_directive(ps: &ParseState, start: usize) -> Result<Statement, AssemblyError> {
    let pos = ps.pos_at(start);
    let name_start = start + 1;
    let (name, after) = scan_identifier(ps.text, name_start)
        .ok_or_else(|| AssemblyError::Syntax { pos: pos.clone(), expected: "a directive name".to_string() })?;
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "org" => parse_org(ps, after, pos),
        "equ" => parse_equ(ps, after, pos),
        "db" => parse_db(ps, after, pos),
        other => Err(AssemblyError::Syntax { pos, expected: format!("unknown directive '.{other}'") }),
    }
}

fn parse_org(ps: &ParseState, after: usize, pos: SourcePos) -> Result<Statement, AssemblyError> {
    let arg_start = skip_ws(ps.text, after);
    ps.clear_expects();
    let (operand, end) = ps
        .parse_kind(OperandKind::Int16, arg_start)
        .ok_or_else(|| farthest_error(ps, arg_start, "a 16-bit address"))?;
    if !is_line_done(ps.text, end) {
        return Err(trailing_error(ps, end));
    }
    Ok(Statement::Directive(DirectiveStmt {
        kind: DirectiveKind::Org,
        operands: vec![operand],
        equ_name: None,
        addr: None,
        length: 0,
        bytes: Vec::new(),
        pos,
    }))
}

fn parse_equ(ps: &ParseState, after: usize, pos: SourcePos) -> Result<Statement, AssemblyError> {
    let name_start = skip_ws(ps.text, after);
    let (name, end) = scan_identifier(ps.text, name_start)
        .ok_or_else(|| AssemblyError::Syntax { pos: pos.clone(), expected: "a constant name".to_string() })?;
    let p = skip_ws(ps.text, end);
    let p = match_literal(ps.text, p, ",")
        .ok_or_else(|| AssemblyError::Syntax { pos: ps.pos_at(p), expected: "','".to_string() })?;
    let arg_start = skip_ws(ps.text, p);
    ps.clear_expects();
    let (operand, end) = ps
        .parse_kind(OperandKind::Int8, arg_start)
        .ok_or_else(|| farthest_error(ps, arg_start, "an 8-bit constant value"))?;
    if !is_line_done(ps.text, end) {
        return Err(trailing_error(ps, end));
    }
    Ok(Statement::Directive(DirectiveStmt {
        kind: DirectiveKind::Equ,
        operands: vec![operand],
        equ_name: Some(name.to_string()),
        addr: None,
        length: 0,
        bytes: Vec::new(),
        pos,
    }))
}

fn parse_db(ps: &ParseState, after: usize, pos: SourcePos) -> Result<Statement, AssemblyError> {
    let mut operands: Vec<Operand> = Vec::new();
    let mut cursor = skip_ws(ps.text, after);
    if is_line_done(ps.text, cursor) {
        log::warn!("{pos}: '.db' directive with zero operands");
    } else {
        loop {
            ps.clear_expects();
            let (op, end) = ps
                .parse_kind(OperandKind::String, cursor)
                .or_else(|| ps.parse_kind(OperandKind::Char, cursor))
                .or_else(|| ps.parse_kind(OperandKind::Int8, cursor))
                .ok_or_else(|| farthest_error(ps, cursor, "a string, character, or 8-bit value"))?;
            operands.push(op);
            cursor = skip_ws(ps.text, end);
            match match_literal(ps.text, cursor, ",") {
                Some(next) => cursor = skip_ws(ps.text, next),
                None => break,
            }
        }
    }
    if !is_line_done(ps.text, cursor) {
        return Err(trailing_error(ps, cursor));
    }
    Ok(Statement::Directive(DirectiveStmt {
        kind: DirectiveKind::Db,
        operands,
        equ_name: None,
        addr: None,
        length: 0,
        bytes: Vec::new(),
        pos,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_instruction() {
        let program = parse_str("ld a, b\n", "t.z80").unwrap();
        assert_eq!(program.len(), 1);
        match &program[0] {
            Statement::Instruction(i) => assert_eq!(i.mnemonic, Mnemonic::Ld),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn parses_label_and_instruction_on_one_line() {
        let program = parse_str("start: halt\n", "t.z80").unwrap();
        assert_eq!(program.len(), 2);
        assert!(matches!(&program[0], Statement::Label(l) if l.name == "start"));
        assert!(matches!(&program[1], Statement::Instruction(i) if i.mnemonic == Mnemonic::Halt));
    }

    #[test]
    fn parses_bare_label() {
        let program = parse_str("start:\n", "t.z80").unwrap();
        match &program[0] {
            Statement::Label(l) => assert_eq!(l.name, "start"),
            _ => panic!("expected label"),
        }
    }

    #[test]
    fn parses_org_directive() {
        let program = parse_str(".org 0x8000\n", "t.z80").unwrap();
        match &program[0] {
            Statement::Directive(d) => {
                assert_eq!(d.kind, DirectiveKind::Org);
                assert_eq!(d.operands[0].resolved_int(), Some(0x8000));
            }
            _ => panic!("expected directive"),
        }
    }

    #[test]
    fn parses_db_with_mixed_operands() {
        let program = parse_str(".db \"AB\", 0x01, 'C'\n", "t.z80").unwrap();
        match &program[0] {
            Statement::Directive(d) => assert_eq!(d.operands.len(), 3),
            _ => panic!("expected directive"),
        }
    }

    #[test]
    fn ignores_comment_and_blank_lines() {
        let program = parse_str("; a comment\n\n   \nnop\n", "t.z80").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn accumulates_errors_across_lines() {
        let err = parse_str("bogus\nnop\nalsobogus\n", "t.z80").unwrap_err();
        assert_eq!(err.0.len(), 2);
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(parse_str("nop extra\n", "t.z80").is_err());
    }
}
