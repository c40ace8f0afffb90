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

//! Renders a laid-out, compiled program as a listing: one line per
//! statement giving its address, encoded bytes (four per line, wrapping
//! onto continuation lines prefixed by their own address), and the
//! mnemonic/directive text.

use std::fmt::Write as _;

use crate::ast::{DirectiveKind, Operand, OperandKind, OperandValue, Program, Statement};

/// Rendering toggles, both off by default (show identifiers, show quoted
/// literal text).
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    pub replace_names: bool,
    pub interpret_literals: bool,
}

const BYTES_PER_LINE: usize = 4;

pub fn print_program(program: &Program, opts: PrintOptions) -> String {
    let mut out = String::new();
    for stmt in program {
        write_statement(&mut out, stmt, opts);
    }
    out
}

fn write_statement(out: &mut String, stmt: &Statement, opts: PrintOptions) {
    match stmt {
        Statement::Label(l) => {
            let addr = l.addr.unwrap_or(0);
            let _ = writeln!(out, "{addr:04X}:                    {}:", l.name);
        }
        Statement::Instruction(i) => {
            let text = format_mnemonic(i.mnemonic.name(), &i.operands, opts);
            write_bytes_and_text(out, i.addr.unwrap_or(0), &i.bytes, &text);
        }
        Statement::Directive(d) => {
            let text = format_directive(d.kind, &d.operands, opts);
            write_bytes_and_text(out, d.addr.unwrap_or(0), &d.bytes, &text);
        }
    }
}

fn write_bytes_and_text(out: &mut String, addr: u16, bytes: &[u8], text: &str) {
    if bytes.is_empty() {
        let _ = writeln!(out, "{addr:04X}:                    {text}");
        return;
    }
    let mut chunks = bytes.chunks(BYTES_PER_LINE);
    let first = chunks.next().unwrap_or(&[]);
    let _ = writeln!(out, "{addr:04X}: {:<12}{text}", hex_bytes(first));
    for (i, chunk) in chunks.enumerate() {
        let line_addr = addr as u32 + ((i + 1) * BYTES_PER_LINE) as u32;
        let _ = writeln!(out, "{line_addr:04X}: {}", hex_bytes(chunk));
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}

fn format_mnemonic(name: &str, operands: &[Operand], opts: PrintOptions) -> String {
    if operands.is_empty() {
        return name.to_string();
    }
    let rendered: Vec<String> = operands.iter().map(|op| render_operand(op, opts)).collect();
    format!("{name} {}", rendered.join(", "))
}

fn format_directive(kind: DirectiveKind, operands: &[Operand], opts: PrintOptions) -> String {
    match kind {
        DirectiveKind::Org => format!(".org {}", render_operand(&operands[0], opts)),
        DirectiveKind::Equ => format!(".equ {}", render_operand(&operands[0], opts)),
        DirectiveKind::Db => {
            let rendered: Vec<String> = operands.iter().map(|op| render_operand(op, opts)).collect();
            format!(".db {}", rendered.join(", "))
        }
    }
}

fn reg_name(code: i32) -> &'static str {
    match code {
        0b000 => "b",
        0b001 => "c",
        0b010 => "d",
        0b011 => "e",
        0b100 => "h",
        0b101 => "l",
        0b111 => "a",
        _ => "?",
    }
}

fn regpair_name(code: i32) -> &'static str {
    match code {
        0b00 => "bc",
        0b01 => "de",
        0b10 => "hl",
        0b11 => "sp",
        _ => "?",
    }
}

fn flag_name(code: i32) -> &'static str {
    match code {
        0b000 => "nz",
        0b001 => "z",
        0b010 => "nc",
        0b011 => "c",
        0b100 => "po",
        0b101 => "pe",
        0b110 => "p",
        0b111 => "m",
        _ => "?",
    }
}

fn escape_byte(b: u8) -> String {
    match b {
        0 => "\\0".to_string(),
        b'\r' => "\\r".to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\'' => "\\'".to_string(),
        b'"' => "\\\"".to_string(),
        0x20..=0x7e => (b as char).to_string(),
        _ => format!("\\x{b:02x}"),
    }
}

fn render_bytes_as_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("0x{b:02X}")).collect::<Vec<_>>().join(" ")
}

fn render_operand(op: &Operand, opts: PrintOptions) -> String {
    use OperandKind::*;
    match op.kind {
        Int8 => format!("0x{:02X}", op.resolved_int().unwrap_or(0) & 0xFF),
        Int16 | Addr => format!("0x{:04X}", op.resolved_int().unwrap_or(0) & 0xFFFF),
        Reg => reg_name(op.resolved_int().unwrap_or(0)).to_string(),
        RegPair => regpair_name(op.resolved_int().unwrap_or(0)).to_string(),
        Af => "af".to_string(),
        Ix => "ix".to_string(),
        Iy => "iy".to_string(),
        IndirectHl => "(hl)".to_string(),
        IndirectBc => "(bc)".to_string(),
        IndirectDe => "(de)".to_string(),
        IndirectSp => "(sp)".to_string(),
        IxdAddr | IydAddr => {
            let reg = if op.kind == IxdAddr { "ix" } else { "iy" };
            let d = op.resolved_int().unwrap_or(0);
            if d == 0 {
                format!("({reg})")
            } else if d > 0 {
                format!("({reg}+{d})")
            } else {
                format!("({reg}{d})")
            }
        }
        Const => {
            if opts.replace_names {
                format!("0x{:02X}", op.resolved_int().unwrap_or(0) & 0xFF)
            } else {
                op.name.clone().unwrap_or_default()
            }
        }
        Flag => flag_name(op.resolved_int().unwrap_or(0)).to_string(),
        AbsLabel => {
            if opts.replace_names {
                format!("0x{:04X}", op.resolved_int().unwrap_or(0) & 0xFFFF)
            } else {
                op.name.clone().unwrap_or_default()
            }
        }
        RelLabel => {
            if opts.replace_names {
                format!("{}", op.resolved_int().unwrap_or(0))
            } else {
                op.name.clone().unwrap_or_default()
            }
        }
        MemLoc => format!("0x{:02X}", op.resolved_int().unwrap_or(0) & 0xFF),
        Char => match &op.value {
            OperandValue::Bytes(b) if opts.interpret_literals => render_bytes_as_hex(b),
            OperandValue::Bytes(b) => format!("'{}'", escape_byte(b[0])),
            _ => String::new(),
        },
        String => match &op.value {
            OperandValue::Bytes(b) if opts.interpret_literals => render_bytes_as_hex(b),
            OperandValue::Bytes(b) => {
                let body: String = b.iter().map(|&c| escape_byte(c)).collect();
                format!("\"{body}\"")
            }
            _ => String::new(),
        },
        IoAddr => format!("(0x{:02X})", op.resolved_int().unwrap_or(0) & 0xFF),
        IoC => "(c)".to_string(),
        BitPos => format!("{}", op.resolved_int().unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::layouter::layout;
    use crate::parser::parse_str;

    fn render(src: &str, opts: PrintOptions) -> String {
        let mut program = parse_str(src, "t.z80").unwrap();
        layout(&mut program).unwrap();
        compile(&mut program).unwrap();
        print_program(&program, opts)
    }

    #[test]
    fn prints_address_and_bytes_for_a_simple_instruction() {
        let listing = render("ld a, b\n", PrintOptions::default());
        assert!(listing.starts_with("0000: 78"));
        assert!(listing.contains("ld a, b"));
    }

    #[test]
    fn replace_names_renders_the_resolved_label_address() {
        let listing = render("jp target\nnop\ntarget: halt\n", PrintOptions { replace_names: true, interpret_literals: false });
        assert!(listing.contains("jp 0x0004"));
    }

    #[test]
    fn default_rendering_keeps_the_label_identifier() {
        let listing = render("jp target\nnop\ntarget: halt\n", PrintOptions::default());
        assert!(listing.contains("jp target"));
    }

    #[test]
    fn interpret_literals_renders_strings_as_hex() {
        let listing = render(".db \"AB\"\n", PrintOptions { replace_names: false, interpret_literals: true });
        assert!(listing.contains("0x41 0x42"));
    }

    #[test]
    fn wraps_long_byte_runs_onto_continuation_lines() {
        let listing = render(".db 1, 2, 3, 4, 5\n", PrintOptions::default());
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0004:"));
    }
}
