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

//! The shared data model that flows through every pipeline stage: parser,
//! layouter, compiler and printer all read or mutate these types in place.

use std::fmt;
use std::sync::Arc;

/// A position in a source file, attached to every operand and statement so
/// diagnostics can point back at the exact text that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePos {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub line_text: Arc<str>,
}

impl SourcePos {
    pub fn new(file: Arc<str>, line: usize, column: usize, line_text: Arc<str>) -> Self {
        Self {
            file,
            line,
            column,
            line_text,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Register {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

impl Register {
    /// Canonical 3-bit field encoding used throughout the instruction table.
    pub fn code(self) -> u8 {
        match self {
            Register::B => 0b000,
            Register::C => 0b001,
            Register::D => 0b010,
            Register::E => 0b011,
            Register::H => 0b100,
            Register::L => 0b101,
            Register::A => 0b111,
        }
    }

    pub fn from_name(name: &str) -> Option<Register> {
        match name {
            "a" => Some(Register::A),
            "b" => Some(Register::B),
            "c" => Some(Register::C),
            "d" => Some(Register::D),
            "e" => Some(Register::E),
            "h" => Some(Register::H),
            "l" => Some(Register::L),
            _ => None,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Register::A => "a",
            Register::B => "b",
            Register::C => "c",
            Register::D => "d",
            Register::E => "e",
            Register::H => "h",
            Register::L => "l",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RegPair {
    Bc,
    De,
    Hl,
    Sp,
}

impl RegPair {
    /// Canonical 2-bit field encoding (bc=00 de=01 hl=10 sp=11).
    pub fn code(self) -> u8 {
        match self {
            RegPair::Bc => 0b00,
            RegPair::De => 0b01,
            RegPair::Hl => 0b10,
            RegPair::Sp => 0b11,
        }
    }

    pub fn from_name(name: &str) -> Option<RegPair> {
        match name {
            "bc" => Some(RegPair::Bc),
            "de" => Some(RegPair::De),
            "hl" => Some(RegPair::Hl),
            "sp" => Some(RegPair::Sp),
            _ => None,
        }
    }
}

impl fmt::Display for RegPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegPair::Bc => "bc",
            RegPair::De => "de",
            RegPair::Hl => "hl",
            RegPair::Sp => "sp",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Z,
    Nz,
    C,
    Nc,
    Pe,
    Po,
    P,
    M,
}

impl Flag {
    /// 3-bit condition code used by JP cc/CALL cc/RET cc.
    pub fn code(self) -> u8 {
        match self {
            Flag::Nz => 0b000,
            Flag::Z => 0b001,
            Flag::Nc => 0b010,
            Flag::C => 0b011,
            Flag::Po => 0b100,
            Flag::Pe => 0b101,
            Flag::P => 0b110,
            Flag::M => 0b111,
        }
    }

    /// Subset of condition codes legal after JR (only the 2-bit carry/zero `cc`).
    pub fn jr_code(self) -> Option<u8> {
        match self {
            Flag::Nz => Some(0b00),
            Flag::Z => Some(0b01),
            Flag::Nc => Some(0b10),
            Flag::C => Some(0b11),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Flag> {
        match name {
            "z" => Some(Flag::Z),
            "nz" => Some(Flag::Nz),
            "c" => Some(Flag::C),
            "nc" => Some(Flag::Nc),
            "pe" => Some(Flag::Pe),
            "po" => Some(Flag::Po),
            "p" => Some(Flag::P),
            "m" => Some(Flag::M),
            _ => None,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flag::Z => "z",
            Flag::Nz => "nz",
            Flag::C => "c",
            Flag::Nc => "nc",
            Flag::Pe => "pe",
            Flag::Po => "po",
            Flag::P => "p",
            Flag::M => "m",
        };
        write!(f, "{s}")
    }
}

/// The syntactic/semantic shape of an operand. Every concrete alternative in
/// the instruction table names one of these; the parser has exactly one
/// parselet per variant (see `parser::operands`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Int8,
    Int16,
    Reg,
    RegPair,
    Af,
    Ix,
    Iy,
    IndirectHl,
    IndirectBc,
    IndirectDe,
    IndirectSp,
    Addr,
    IxdAddr,
    IydAddr,
    Const,
    Flag,
    AbsLabel,
    RelLabel,
    MemLoc,
    Char,
    String,
    /// `(n)` I/O address, e.g. `in a, (0x10)`.
    IoAddr,
    /// `(c)` I/O register indirection, e.g. `in a, (c)`.
    IoC,
    BitPos,
}

/// The value carried by an operand, before or after label/constant
/// resolution. Kept inside a single `Operand` type (rather than two
/// statically distinct pre/post-resolution types) — see DESIGN.md.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandValue {
    /// A resolved (or never-symbolic) numeric value.
    Int(i32),
    /// A still-unresolved identifier (label or constant name).
    Name(String),
    /// A character or string literal's raw bytes.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub kind: OperandKind,
    pub value: OperandValue,
    /// The original identifier, retained through resolution for display.
    pub name: Option<String>,
    pub pos: SourcePos,
}

impl Operand {
    pub fn int(kind: OperandKind, value: i32, pos: SourcePos) -> Self {
        Self {
            kind,
            value: OperandValue::Int(value),
            name: None,
            pos,
        }
    }

    pub fn symbolic(kind: OperandKind, name: String, pos: SourcePos) -> Self {
        Self {
            value: OperandValue::Name(name.clone()),
            name: Some(name),
            kind,
            pos,
        }
    }

    pub fn bytes(kind: OperandKind, bytes: Vec<u8>, pos: SourcePos) -> Self {
        Self {
            kind,
            value: OperandValue::Bytes(bytes),
            name: None,
            pos,
        }
    }

    /// Resolved numeric value, or `None` if this operand still carries an
    /// unresolved name. The compiler must never observe `None` here; the
    /// layouter is responsible for resolving every symbolic operand.
    pub fn resolved_int(&self) -> Option<i32> {
        match &self.value {
            OperandValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.value, OperandValue::Name(_))
    }
}

/// An instruction mnemonic, independent of its addressing-mode alternative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Ld,
    Push,
    Pop,
    Ex,
    Exx,
    Ldi,
    Ldir,
    Ldd,
    Lddr,
    Cpi,
    Cpir,
    Cpd,
    Cpdr,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Daa,
    Cpl,
    Neg,
    Ccf,
    Scf,
    Nop,
    Halt,
    Di,
    Ei,
    Im,
    Rlca,
    Rla,
    Rrca,
    Rra,
    Rlc,
    Rl,
    Rrc,
    Rr,
    Sla,
    Sra,
    Srl,
    Rld,
    Rrd,
    Bit,
    Set,
    Res,
    Jp,
    Jr,
    Djnz,
    Call,
    Ret,
    Reti,
    Retn,
    Rst,
    In,
    Ini,
    Inir,
    Ind,
    Indr,
    Out,
    Outi,
    Otir,
    Outd,
    Otdr,
}

impl Mnemonic {
    pub fn from_name(name: &str) -> Option<Mnemonic> {
        use Mnemonic::*;
        Some(match name {
            "ld" => Ld,
            "push" => Push,
            "pop" => Pop,
            "ex" => Ex,
            "exx" => Exx,
            "ldi" => Ldi,
            "ldir" => Ldir,
            "ldd" => Ldd,
            "lddr" => Lddr,
            "cpi" => Cpi,
            "cpir" => Cpir,
            "cpd" => Cpd,
            "cpdr" => Cpdr,
            "add" => Add,
            "adc" => Adc,
            "sub" => Sub,
            "sbc" => Sbc,
            "and" => And,
            "or" => Or,
            "xor" => Xor,
            "cp" => Cp,
            "inc" => Inc,
            "dec" => Dec,
            "daa" => Daa,
            "cpl" => Cpl,
            "neg" => Neg,
            "ccf" => Ccf,
            "scf" => Scf,
            "nop" => Nop,
            "halt" => Halt,
            "di" => Di,
            "ei" => Ei,
            "im" => Im,
            "rlca" => Rlca,
            "rla" => Rla,
            "rrca" => Rrca,
            "rra" => Rra,
            "rlc" => Rlc,
            "rl" => Rl,
            "rrc" => Rrc,
            "rr" => Rr,
            "sla" => Sla,
            "sra" => Sra,
            "srl" => Srl,
            "rld" => Rld,
            "rrd" => Rrd,
            "bit" => Bit,
            "set" => Set,
            "res" => Res,
            "jp" => Jp,
            "jr" => Jr,
            "djnz" => Djnz,
            "call" => Call,
            "ret" => Ret,
            "reti" => Reti,
            "retn" => Retn,
            "rst" => Rst,
            "in" => In,
            "ini" => Ini,
            "inir" => Inir,
            "ind" => Ind,
            "indr" => Indr,
            "out" => Out,
            "outi" => Outi,
            "otir" => Otir,
            "outd" => Outd,
            "otdr" => Otdr,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Ld => "ld",
            Push => "push",
            Pop => "pop",
            Ex => "ex",
            Exx => "exx",
            Ldi => "ldi",
            Ldir => "ldir",
            Ldd => "ldd",
            Lddr => "lddr",
            Cpi => "cpi",
            Cpir => "cpir",
            Cpd => "cpd",
            Cpdr => "cpdr",
            Add => "add",
            Adc => "adc",
            Sub => "sub",
            Sbc => "sbc",
            And => "and",
            Or => "or",
            Xor => "xor",
            Cp => "cp",
            Inc => "inc",
            Dec => "dec",
            Daa => "daa",
            Cpl => "cpl",
            Neg => "neg",
            Ccf => "ccf",
            Scf => "scf",
            Nop => "nop",
            Halt => "halt",
            Di => "di",
            Ei => "ei",
            Im => "im",
            Rlca => "rlca",
            Rla => "rla",
            Rrca => "rrca",
            Rra => "rra",
            Rlc => "rlc",
            Rl => "rl",
            Rrc => "rrc",
            Rr => "rr",
            Sla => "sla",
            Sra => "sra",
            Srl => "srl",
            Rld => "rld",
            Rrd => "rrd",
            Bit => "bit",
            Set => "set",
            Res => "res",
            Jp => "jp",
            Jr => "jr",
            Djnz => "djnz",
            Call => "call",
            Ret => "ret",
            Reti => "reti",
            Retn => "retn",
            Rst => "rst",
            In => "in",
            Ini => "ini",
            Inir => "inir",
            Ind => "ind",
            Indr => "indr",
            Out => "out",
            Outi => "outi",
            Otir => "otir",
            Outd => "outd",
            Otdr => "otdr",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveKind {
    Org,
    Equ,
    Db,
}

#[derive(Debug, Clone)]
pub struct InstructionStmt {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
    /// Filled in by the layouter from the instruction table.
    pub length: u8,
    /// Filled in by the layouter.
    pub addr: Option<u16>,
    /// Filled in by the compiler.
    pub bytes: Vec<u8>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub struct DirectiveStmt {
    pub kind: DirectiveKind,
    pub operands: Vec<Operand>,
    /// `.equ name, value` stores the constant name here; unused otherwise.
    pub equ_name: Option<String>,
    pub addr: Option<u16>,
    pub length: u32,
    pub bytes: Vec<u8>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub struct LabelStmt {
    pub name: String,
    pub addr: Option<u16>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Instruction(InstructionStmt),
    Directive(DirectiveStmt),
    Label(LabelStmt),
}

impl Statement {
    pub fn pos(&self) -> &SourcePos {
        match self {
            Statement::Instruction(i) => &i.pos,
            Statement::Directive(d) => &d.pos,
            Statement::Label(l) => &l.pos,
        }
    }

    pub fn addr(&self) -> Option<u16> {
        match self {
            Statement::Instruction(i) => i.addr,
            Statement::Directive(d) => d.addr,
            Statement::Label(l) => l.addr,
        }
    }
}

/// The full statement sequence produced by the parser, mutated in place by
/// the layouter and compiler.
pub type Program = Vec<Statement>;
