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

//! One atomic, memoized parselet per `OperandKind`. `ParseState` owns the
//! packrat memo table and the farthest-failure "expects" map for a single
//! line; both are reset when a new line starts (see `parser::mod`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{Flag, Operand, OperandKind, RegPair, Register, SourcePos};

use super::lexer::*;

const RESERVED: &[&str] = &[
    "a", "b", "c", "d", "e", "h", "l", "bc", "de", "hl", "sp", "af", "ix", "iy", "z", "nz", "nc",
    "pe", "po", "p", "m",
];

pub struct ParseState<'a> {
    pub text: &'a str,
    file: Arc<str>,
    line_no: usize,
    line_text: Arc<str>,
    memo: RefCell<HashMap<(OperandKind, usize), Option<(Operand, usize)>>>,
    expects: RefCell<HashMap<usize, Vec<String>>>,
}

impl<'a> ParseState<'a> {
    pub fn new(text: &'a str, file: Arc<str>, line_no: usize) -> Self {
        ParseState {
            text,
            file,
            line_no,
            line_text: Arc::from(text),
            memo: RefCell::new(HashMap::new()),
            expects: RefCell::new(HashMap::new()),
        }
    }

    pub fn pos_at(&self, pos: usize) -> SourcePos {
        SourcePos::new(self.file.clone(), self.line_no, pos + 1, self.line_text.clone())
    }

    fn expect(&self, pos: usize, what: &str) {
        self.expects.borrow_mut().entry(pos).or_default().push(what.to_string());
    }

    /// The farthest position any parselet failed at, plus its last
    /// recorded expectation — the "expected X" diagnostic target.
    pub fn farthest_failure(&self) -> Option<(usize, String)> {
        let expects = self.expects.borrow();
        expects
            .iter()
            .max_by_key(|(pos, _)| **pos)
            .map(|(pos, whats)| (*pos, whats.last().cloned().unwrap_or_default()))
    }

    pub fn clear_expects(&self) {
        self.expects.borrow_mut().clear();
    }

    /// Memoized dispatch: look up `(kind, pos)`, computing and caching on
    /// miss. This is the sole entry point every caller (operand-shape
    /// alternative, mnemonic dispatch) should use.
    pub fn parse_kind(&self, kind: OperandKind, pos: usize) -> Option<(Operand, usize)> {
        if let Some(cached) = self.memo.borrow().get(&(kind, pos)) {
            return cached.clone();
        }
        let result = self.dispatch(kind, pos);
        self.memo.borrow_mut().insert((kind, pos), result.clone());
        result
    }

    fn dispatch(&self, kind: OperandKind, pos: usize) -> Option<(Operand, usize)> {
        match kind {
            OperandKind::Int8 => self.rec_int(pos, OperandKind::Int8, -128, 255),
            OperandKind::Int16 => self.rec_int(pos, OperandKind::Int16, -32768, 65535),
            OperandKind::Reg => self.rec_reg(pos),
            OperandKind::RegPair => self.rec_regpair(pos),
            OperandKind::Af => self.rec_af(pos),
            OperandKind::Ix => self.rec_bare_keyword(pos, "ix", OperandKind::Ix),
            OperandKind::Iy => self.rec_bare_keyword(pos, "iy", OperandKind::Iy),
            OperandKind::IndirectHl => self.rec_indirect_keyword(pos, "hl", OperandKind::IndirectHl),
            OperandKind::IndirectBc => self.rec_indirect_keyword(pos, "bc", OperandKind::IndirectBc),
            OperandKind::IndirectDe => self.rec_indirect_keyword(pos, "de", OperandKind::IndirectDe),
            OperandKind::IndirectSp => self.rec_indirect_keyword(pos, "sp", OperandKind::IndirectSp),
            OperandKind::Addr => self.rec_addr(pos),
            OperandKind::IxdAddr => self.rec_indexed_addr(pos, "ix", OperandKind::IxdAddr),
            OperandKind::IydAddr => self.rec_indexed_addr(pos, "iy", OperandKind::IydAddr),
            OperandKind::Const => self.rec_const(pos),
            OperandKind::Flag => self.rec_flag(pos),
            OperandKind::AbsLabel => self.rec_label(pos, OperandKind::AbsLabel),
            OperandKind::RelLabel => self.rec_label(pos, OperandKind::RelLabel),
            OperandKind::MemLoc => self.rec_memloc(pos),
            OperandKind::Char => self.rec_char(pos),
            OperandKind::String => self.rec_string(pos),
            OperandKind::IoAddr => self.rec_io_addr(pos),
            OperandKind::IoC => self.rec_io_c(pos),
            OperandKind::BitPos => self.rec_bitpos(pos),
        }
    }

    fn rec_int(&self, pos: usize, kind: OperandKind, lo: i64, hi: i64) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        match scan_integer(self.text, p) {
            Some((v, end)) if v >= lo && v <= hi => {
                let width = if kind == OperandKind::Int8 { 256 } else { 65536 };
                let masked = ((v % width) + width) % width;
                Some((Operand::int(kind, masked as i32, self.pos_at(pos)), end))
            }
            Some(_) => {
                let bits = if kind == OperandKind::Int8 { 8 } else { 16 };
                self.expect(p, &format!("integer literal fitting in {bits} bits"));
                None
            }
            None => {
                self.expect(p, "integer literal");
                None
            }
        }
    }

    fn rec_reg(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (ident, end) = scan_identifier(self.text, p)?;
        let lower = ident.to_ascii_lowercase();
        match Register::from_name(&lower) {
            Some(r) => Some((Operand::int(OperandKind::Reg, r.code() as i32, self.pos_at(pos)), end)),
            None => {
                self.expect(p, "register (a, b, c, d, e, h or l)");
                None
            }
        }
    }

    fn rec_regpair(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (ident, end) = scan_identifier(self.text, p)?;
        let lower = ident.to_ascii_lowercase();
        match RegPair::from_name(&lower) {
            Some(rp) => Some((Operand::int(OperandKind::RegPair, rp.code() as i32, self.pos_at(pos)), end)),
            None => {
                self.expect(p, "register pair (bc, de, hl or sp)");
                None
            }
        }
    }

    fn rec_af(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let end = match_keyword(self.text, p, "af")?;
        let end = match_literal(self.text, end, "'").unwrap_or(end);
        Some((Operand::int(OperandKind::Af, 0, self.pos_at(pos)), end))
    }

    fn rec_bare_keyword(&self, pos: usize, kw: &str, kind: OperandKind) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        match match_keyword(self.text, p, kw) {
            Some(end) => Some((Operand::int(kind, 0, self.pos_at(pos)), end)),
            None => {
                self.expect(p, kw);
                None
            }
        }
    }

    fn rec_indirect_keyword(&self, pos: usize, kw: &str, kind: OperandKind) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let p = match_literal(self.text, p, "(")?;
        let p = skip_ws(self.text, p);
        let p = match_keyword(self.text, p, kw)?;
        let p = skip_ws(self.text, p);
        let end = match_literal(self.text, p, ")")?;
        Some((Operand::int(kind, 0, self.pos_at(pos)), end))
    }

    fn rec_addr(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let p = match_literal(self.text, p, "(")?;
        let p = skip_ws(self.text, p);
        let (v, p) = scan_integer(self.text, p)?;
        if !(0..=65535).contains(&v) {
            self.expect(p, "16-bit address");
            return None;
        }
        let p = skip_ws(self.text, p);
        let end = match_literal(self.text, p, ")")?;
        Some((Operand::int(OperandKind::Addr, v as i32, self.pos_at(pos)), end))
    }

    fn rec_indexed_addr(&self, pos: usize, kw: &str, kind: OperandKind) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let p = match_literal(self.text, p, "(")?;
        let p = skip_ws(self.text, p);
        let p = match_keyword(self.text, p, kw)?;
        let p = skip_ws(self.text, p);
        let (disp, p) = if matches!(self.text.as_bytes().get(p), Some(b'+') | Some(b'-')) {
            scan_integer(self.text, p)?
        } else {
            (0, p)
        };
        if !(-128..=127).contains(&disp) {
            self.expect(p, "displacement fitting in a signed byte");
            return None;
        }
        let p = skip_ws(self.text, p);
        let end = match_literal(self.text, p, ")")?;
        Some((Operand::int(kind, disp as i32, self.pos_at(pos)), end))
    }

    fn rec_const(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (ident, end) = scan_identifier(self.text, p)?;
        if RESERVED.iter().any(|r| ident.eq_ignore_ascii_case(r)) {
            return None;
        }
        Some((Operand::symbolic(OperandKind::Const, ident.to_string(), self.pos_at(pos)), end))
    }

    fn rec_label(&self, pos: usize, kind: OperandKind) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (ident, end) = scan_identifier(self.text, p)?;
        if RESERVED.iter().any(|r| ident.eq_ignore_ascii_case(r)) {
            self.expect(p, "label name");
            return None;
        }
        Some((Operand::symbolic(kind, ident.to_string(), self.pos_at(pos)), end))
    }

    fn rec_flag(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (ident, end) = scan_identifier(self.text, p)?;
        let lower = ident.to_ascii_lowercase();
        match Flag::from_name(&lower) {
            Some(f) => Some((Operand::int(OperandKind::Flag, f.code() as i32, self.pos_at(pos)), end)),
            None => {
                self.expect(p, "condition flag (z, nz, c, nc, pe, po, p or m)");
                None
            }
        }
    }

    fn rec_memloc(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (v, end) = scan_integer(self.text, p)?;
        const VALID: [i64; 8] = [0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38];
        if VALID.contains(&v) {
            Some((Operand::int(OperandKind::MemLoc, v as i32, self.pos_at(pos)), end))
        } else {
            self.expect(p, "page-0 restart address (0x00, 0x08, ..., 0x38)");
            None
        }
    }

    fn rec_char(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        match scan_char_literal(self.text, p) {
            Some((b, end)) => Some((Operand::bytes(OperandKind::Char, vec![b], self.pos_at(pos)), end)),
            None => {
                self.expect(p, "character literal");
                None
            }
        }
    }

    fn rec_string(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        match scan_string_literal(self.text, p) {
            Some((bytes, end)) => Some((Operand::bytes(OperandKind::String, bytes, self.pos_at(pos)), end)),
            None => {
                self.expect(p, "string literal");
                None
            }
        }
    }

    fn rec_io_addr(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let p = match_literal(self.text, p, "(")?;
        let p = skip_ws(self.text, p);
        let (v, p) = scan_integer(self.text, p)?;
        if !(0..=255).contains(&v) {
            self.expect(p, "8-bit I/O port address");
            return None;
        }
        let p = skip_ws(self.text, p);
        let end = match_literal(self.text, p, ")")?;
        Some((Operand::int(OperandKind::IoAddr, v as i32, self.pos_at(pos)), end))
    }

    fn rec_io_c(&self, pos: usize) -> Option<(Operand, usize)> {
        self.rec_indirect_keyword(pos, "c", OperandKind::IoC)
    }

    fn rec_bitpos(&self, pos: usize) -> Option<(Operand, usize)> {
        let p = skip_ws(self.text, pos);
        let (v, end) = scan_integer(self.text, p)?;
        if (0..=7).contains(&v) {
            Some((Operand::int(OperandKind::BitPos, v as i32, self.pos_at(pos)), end))
        } else {
            self.expect(p, "bit position 0-7");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> ParseState<'_> {
        ParseState::new(text, Arc::from("test.z80"), 1)
    }

    #[test]
    fn parses_register() {
        let ps = state("a");
        let (op, end) = ps.parse_kind(OperandKind::Reg, 0).unwrap();
        assert_eq!(op.resolved_int(), Some(Register::A.code() as i32));
        assert_eq!(end, 1);
    }

    #[test]
    fn parses_indexed_address_with_negative_displacement() {
        let ps = state("(ix-3)");
        let (op, end) = ps.parse_kind(OperandKind::IxdAddr, 0).unwrap();
        assert_eq!(op.resolved_int(), Some(-3));
        assert_eq!(end, 6);
    }

    #[test]
    fn bare_index_register_defaults_to_zero_displacement() {
        let ps = state("(ix)");
        let (op, _) = ps.parse_kind(OperandKind::IxdAddr, 0).unwrap();
        assert_eq!(op.resolved_int(), Some(0));
    }

    #[test]
    fn memo_caches_repeat_lookups() {
        let ps = state("b");
        let first = ps.parse_kind(OperandKind::Reg, 0);
        let second = ps.parse_kind(OperandKind::Reg, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn const_rejects_reserved_words() {
        let ps = state("hl");
        assert!(ps.parse_kind(OperandKind::Const, 0).is_none());
    }

    #[test]
    fn farthest_failure_picks_max_column() {
        let ps = state("xz");
        assert!(ps.parse_kind(OperandKind::Reg, 0).is_none());
        assert!(ps.parse_kind(OperandKind::Flag, 0).is_none());
        let (pos, _) = ps.farthest_failure().unwrap();
        assert_eq!(pos, 0);
    }
}
