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

//! Two logical passes over a parsed program: assign every statement its
//! address (and every instruction/directive its byte length), then resolve
//! every symbolic operand (label or constant reference) against the tables
//! built along the way.

use std::collections::HashMap;

use crate::ast::{
    DirectiveKind, DirectiveStmt, InstructionStmt, Operand, OperandKind, OperandValue, Program,
    Statement,
};
use crate::errors::{AssemblyError, ErrorList};
use crate::instruction_table;

struct Symbols {
    labels: HashMap<String, u16>,
    consts: HashMap<String, i32>,
}

/// Assign addresses and byte lengths to every statement, then resolve every
/// label/constant reference against the tables built while doing so.
/// Errors from both passes are accumulated into a single composite.
pub fn layout(program: &mut Program) -> Result<(), ErrorList> {
    let mut errors = ErrorList::new();
    let symbols = assign_addresses(program, &mut errors);
    resolve_operands(program, &symbols, &mut errors);
    errors.into_result(())
}

fn directive_length(d: &DirectiveStmt) -> u32 {
    match d.kind {
        DirectiveKind::Org | DirectiveKind::Equ => 0,
        DirectiveKind::Db => d
            .operands
            .iter()
            .map(|op| match &op.value {
                OperandValue::Bytes(b) => b.len() as u32,
                _ => 1,
            })
            .sum(),
    }
}

fn instruction_length(i: &InstructionStmt) -> Option<u8> {
    instruction_table::find_alt(i.mnemonic, &i.operands).map(|alt| alt.encoding.len())
}

/// Pass 1: walk the statement sequence once, in order, handing out
/// addresses. This is a single pass (not two) because addresses are purely
/// positional — no statement's address depends on another statement's
/// *operand value*, only on the lengths of everything before it, which are
/// already known from the parsed operand kinds.
fn assign_addresses(program: &mut Program, errors: &mut ErrorList) -> Symbols {
    let mut labels: HashMap<String, u16> = HashMap::new();
    let mut consts: HashMap<String, i32> = HashMap::new();
    let mut pc: u32 = 0;

    for stmt in program.iter_mut() {
        match stmt {
            Statement::Label(l) => {
                if labels.contains_key(&l.name) {
                    errors.push(AssemblyError::Structural {
                        pos: l.pos.clone(),
                        reason: format!("label '{}' is redefined", l.name),
                    });
                }
                l.addr = Some(pc as u16);
                labels.insert(l.name.clone(), pc as u16);
            }
            Statement::Instruction(i) => {
                let Some(len) = instruction_length(i) else {
                    errors.push(AssemblyError::Structural {
                        pos: i.pos.clone(),
                        reason: format!("no encoding matches '{}' with these operands", i.mnemonic.name()),
                    });
                    continue;
                };
                i.length = len;
                i.addr = Some(pc as u16);
                pc += len as u32;
            }
            Statement::Directive(d) => match d.kind {
                DirectiveKind::Org => {
                    let target = d.operands[0].resolved_int().unwrap_or(0);
                    if (target as u32) < pc {
                        errors.push(AssemblyError::Semantic {
                            pos: d.pos.clone(),
                            reason: format!(".org cannot move the address backwards (from {pc:#06x} to {target:#06x})"),
                        });
                    }
                    pc = target as u32;
                    d.addr = Some(pc as u16);
                    d.length = 0;
                }
                DirectiveKind::Equ => {
                    let name = d.equ_name.clone().unwrap_or_default();
                    if consts.contains_key(&name) {
                        errors.push(AssemblyError::Structural {
                            pos: d.pos.clone(),
                            reason: format!("constant '{name}' is redefined"),
                        });
                    }
                    let value = d.operands[0].resolved_int().unwrap_or(0);
                    consts.insert(name, value);
                    d.addr = Some(pc as u16);
                    d.length = 0;
                }
                DirectiveKind::Db => {
                    let len = directive_length(d);
                    d.length = len;
                    d.addr = Some(pc as u16);
                    pc += len;
                }
            },
        }
        if pc > 0x10000 {
            errors.push(AssemblyError::Semantic {
                pos: stmt.pos().clone(),
                reason: "program exceeds the 64KiB address space".to_string(),
            });
        }
    }

    Symbols { labels, consts }
}

/// Pass 2: substitute every still-symbolic operand value. `AbsLabel` and
/// `RelLabel` consult the label table (the latter also computing and
/// range-checking the jump displacement); every other kind carrying a name
/// (in practice, only `Const`) consults the constant table.
fn resolve_operands(program: &mut Program, symbols: &Symbols, errors: &mut ErrorList) {
    for stmt in program.iter_mut() {
        let (operands, host_addr) = match stmt {
            Statement::Instruction(i) => (&mut i.operands, i.addr),
            Statement::Directive(d) => (&mut d.operands, d.addr),
            Statement::Label(_) => continue,
        };
        for op in operands.iter_mut() {
            resolve_operand(op, host_addr, symbols, errors);
        }
    }
}

fn resolve_operand(op: &mut Operand, host_addr: Option<u16>, symbols: &Symbols, errors: &mut ErrorList) {
    let name = match &op.value {
        OperandValue::Name(n) => n.clone(),
        _ => return,
    };

    match op.kind {
        OperandKind::AbsLabel => match symbols.labels.get(&name) {
            Some(&addr) => op.value = OperandValue::Int(addr as i32),
            None => errors.push(AssemblyError::Semantic {
                pos: op.pos.clone(),
                reason: format!("undefined label '{name}'"),
            }),
        },
        OperandKind::RelLabel => match symbols.labels.get(&name) {
            Some(&target) => {
                let a = host_addr.unwrap_or(0) as i32;
                let d = target as i32 - a;
                if !(-126..=129).contains(&d) {
                    errors.push(AssemblyError::Semantic {
                        pos: op.pos.clone(),
                        reason: format!("label '{name}' outside relative jump range (offset {d})"),
                    });
                    return;
                }
                op.value = OperandValue::Int(d);
            }
            None => errors.push(AssemblyError::Semantic {
                pos: op.pos.clone(),
                reason: format!("undefined label '{name}'"),
            }),
        },
        _ => match symbols.consts.get(&name) {
            Some(&value) => op.value = OperandValue::Int(value),
            None => errors.push(AssemblyError::Semantic {
                pos: op.pos.clone(),
                reason: format!("undefined constant '{name}'"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn layout_str(src: &str) -> Program {
        let mut program = parse_str(src, "t.z80").unwrap();
        layout(&mut program).unwrap();
        program
    }

    #[test]
    fn assigns_sequential_addresses() {
        let program = layout_str("nop\nnop\nld a, b\n");
        assert_eq!(program[0].addr(), Some(0));
        assert_eq!(program[1].addr(), Some(1));
        assert_eq!(program[2].addr(), Some(2));
    }

    #[test]
    fn org_moves_the_program_counter() {
        let program = layout_str(".org 0x8000\nnop\n");
        assert_eq!(program[1].addr(), Some(0x8000));
    }

    #[test]
    fn forward_label_reference_resolves() {
        let program = layout_str("jp target\nnop\ntarget: halt\n");
        match &program[0] {
            Statement::Instruction(i) => assert_eq!(i.operands[0].resolved_int(), Some(4)),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn relative_jump_to_self_resolves_to_zero_offset() {
        let program = layout_str("loop: jr loop\n");
        match &program[1] {
            Statement::Instruction(i) => assert_eq!(i.operands[0].resolved_int(), Some(0)),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn equ_constant_substitutes_into_immediate() {
        let program = layout_str(".equ width, 40\nld a, width\n");
        match &program[1] {
            Statement::Instruction(i) => assert_eq!(i.operands[1].resolved_int(), Some(40)),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn undefined_label_is_an_error() {
        assert!(parse_and_layout("jp nowhere\n").is_err());
    }

    #[test]
    fn out_of_range_relative_jump_is_an_error() {
        let mut src = String::from("start: jr far\n");
        for _ in 0..200 {
            src.push_str("nop\n");
        }
        src.push_str("far: halt\n");
        assert!(parse_and_layout(&src).is_err());
    }

    fn parse_and_layout(src: &str) -> Result<Program, ErrorList> {
        let mut program = parse_str(src, "t.z80")?;
        layout(&mut program)?;
        Ok(program)
    }
}
