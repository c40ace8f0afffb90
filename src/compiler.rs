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

//! Turns a laid-out program (every operand resolved, every address
//! assigned) into concrete bytes: first per-statement, by invoking each
//! instruction's chosen encoder, then as a single flat binary image with
//! `.org` gaps zero-filled.

use crate::ast::{DirectiveKind, OperandValue, Program, Statement};
use crate::errors::{AssemblyError, ErrorList};
use crate::instruction_table;

/// Fill in `InstructionStmt::bytes` / `DirectiveStmt::bytes` for every
/// statement. Must run after `layouter::layout` — every operand has to be
/// numeric by now, or the encoder has nothing to encode.
pub fn compile(program: &mut Program) -> Result<(), ErrorList> {
    let mut errors = ErrorList::new();
    for stmt in program.iter_mut() {
        match stmt {
            Statement::Instruction(i) => {
                let Some(alt) = instruction_table::find_alt(i.mnemonic, &i.operands) else {
                    errors.push(AssemblyError::Internal {
                        reason: format!("no encoding found for '{}' during compile", i.mnemonic.name()),
                    });
                    continue;
                };
                let args: Vec<i32> = i
                    .operands
                    .iter()
                    .map(|op| op.resolved_int().unwrap_or(0))
                    .collect();
                let bytes = alt.encoding.encode(&args);
                if bytes.len() != alt.encoding.len() as usize {
                    errors.push(AssemblyError::Internal {
                        reason: format!(
                            "encoder for '{}' produced {} bytes, expected {}",
                            i.mnemonic.name(),
                            bytes.len(),
                            alt.encoding.len()
                        ),
                    });
                    continue;
                }
                i.bytes = bytes;
            }
            Statement::Directive(d) if d.kind == DirectiveKind::Db => {
                let mut bytes = Vec::with_capacity(d.length as usize);
                for op in &d.operands {
                    match &op.value {
                        OperandValue::Bytes(b) => bytes.extend_from_slice(b),
                        OperandValue::Int(v) => bytes.push((*v & 0xFF) as u8),
                        OperandValue::Name(n) => errors.push(AssemblyError::Internal {
                            reason: format!("'.db' operand '{n}' was never resolved"),
                        }),
                    }
                }
                d.bytes = bytes;
            }
            Statement::Directive(_) | Statement::Label(_) => {}
        }
    }
    errors.into_result(())
}

/// Flatten a compiled program into one binary image. Gaps left by `.org`
/// (or by a program that starts above address 0) are zero-filled; nothing
/// before the lowest emitted address is included.
pub fn emit(program: &Program) -> Vec<u8> {
    let mut max_end: usize = 0;
    for stmt in program {
        let (addr, len) = match stmt {
            Statement::Instruction(i) => (i.addr, i.bytes.len()),
            Statement::Directive(d) => (d.addr, d.bytes.len()),
            Statement::Label(_) => continue,
        };
        if let Some(a) = addr {
            max_end = max_end.max(a as usize + len);
        }
    }

    let mut image = vec![0u8; max_end];
    for stmt in program {
        let (addr, bytes): (Option<u16>, &[u8]) = match stmt {
            Statement::Instruction(i) => (i.addr, &i.bytes),
            Statement::Directive(d) => (d.addr, &d.bytes),
            Statement::Label(_) => continue,
        };
        if let Some(a) = addr {
            let start = a as usize;
            image[start..start + bytes.len()].copy_from_slice(bytes);
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouter::layout;
    use crate::parser::parse_str;

    fn build(src: &str) -> Program {
        let mut program = parse_str(src, "t.z80").unwrap();
        layout(&mut program).unwrap();
        compile(&mut program).unwrap();
        program
    }

    #[test]
    fn ld_a_b_compiles_to_0x78() {
        let program = build("ld a, b\n");
        match &program[0] {
            Statement::Instruction(i) => assert_eq!(i.bytes, vec![0x78]),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn ld_bc_nn_compiles_little_endian() {
        let program = build("ld bc, 0xdead\n");
        match &program[0] {
            Statement::Instruction(i) => assert_eq!(i.bytes, vec![0x01, 0xad, 0xde]),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn relative_jump_to_self_emits_0xfe() {
        let program = build("loop: jr loop\n");
        match &program[1] {
            Statement::Instruction(i) => assert_eq!(i.bytes, vec![0x18, 0xFE]),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn db_directive_concatenates_strings_chars_and_ints() {
        let program = build(".db \"AB\", 'C', 1\n");
        match &program[0] {
            Statement::Directive(d) => assert_eq!(d.bytes, vec![b'A', b'B', b'C', 1]),
            _ => panic!("expected directive"),
        }
    }

    #[test]
    fn emit_zero_fills_the_org_gap() {
        let program = build("nop\n.org 4\nhalt\n");
        let image = emit(&program);
        assert_eq!(image, vec![0x00, 0x00, 0x00, 0x00, 0x76]);
    }
}
