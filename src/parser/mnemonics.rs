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

//! The operand-alternative dispatch loop described in §4.1: try each
//! alternative for a mnemonic in declaration order, committing to the
//! first whose whole operand-shape tuple parses (and whose guard, if any,
//! accepts the result).

use crate::ast::{Mnemonic, Operand};
use crate::instruction_table::{self, Alt};

use super::lexer::{match_literal, skip_ws};
use super::operands::ParseState;

fn parse_alt(ps: &ParseState, start: usize, alt: &Alt) -> Option<(Vec<Operand>, usize)> {
    let mut pos = start;
    let mut ops = Vec::with_capacity(alt.shape.len());
    for (i, kind) in alt.shape.iter().enumerate() {
        if i > 0 {
            let p = skip_ws(ps.text, pos);
            pos = match_literal(ps.text, p, ",")?;
        }
        let (op, end) = ps.parse_kind(*kind, pos)?;
        ops.push(op);
        pos = end;
    }
    if alt.guard.is_some_and(|g| !g(&ops)) {
        return None;
    }
    Some((ops, pos))
}

/// Try every alternative for `mnemonic` starting at `start`, in table
/// order. Returns the parsed operands and the position just past them.
pub fn dispatch(ps: &ParseState, start: usize, mnemonic: Mnemonic) -> Option<(Vec<Operand>, usize)> {
    for alt in instruction_table::alts_for(mnemonic) {
        if let Some(result) = parse_alt(ps, start, alt) {
            return Some(result);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;
    use std::sync::Arc;

    #[test]
    fn ld_a_b_dispatches_to_reg_reg_alt() {
        let ps = ParseState::new("a, b", Arc::from("t.z80"), 1);
        let (ops, end) = dispatch(&ps, 0, Mnemonic::Ld).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].resolved_int(), Some(Register::A.code() as i32));
        assert_eq!(end, 4);
    }

    #[test]
    fn nop_has_no_operands() {
        let ps = ParseState::new("", Arc::from("t.z80"), 1);
        let (ops, end) = dispatch(&ps, 0, Mnemonic::Nop).unwrap();
        assert!(ops.is_empty());
        assert_eq!(end, 0);
    }

    #[test]
    fn add_a_b_requires_a_as_destination() {
        let ps = ParseState::new("b, c", Arc::from("t.z80"), 1);
        assert!(dispatch(&ps, 0, Mnemonic::Add).is_none());
    }
}
