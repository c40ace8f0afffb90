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

//! The DAA correction table, transcribed verbatim (by nibble-range rule,
//! not reimplemented from a closed-form formula) from "The Undocumented
//! Z80 Documented". Each entry is tried in order; the first whose (carry,
//! half-carry, high-nibble range, low-nibble range) rule matches the
//! pre-correction accumulator and flags wins.

fn high_nibble(v: u8) -> u8 {
    v >> 4
}
fn low_nibble(v: u8) -> u8 {
    v & 0x0f
}
fn in_range(v: u8, (lo, hi): (u8, u8)) -> bool {
    v >= lo && v <= hi
}

/// (carry-in, half-carry-in, high-nibble range, low-nibble range) → (correction
/// to apply, carry-out).
type Rule = (bool, bool, (u8, u8), (u8, u8), u8, bool);

const CORRECTIONS: &[Rule] = &[
    (false, false, (0x0, 0x9), (0x0, 0x9), 0x00, false),
    (false, true, (0x0, 0x9), (0x0, 0x9), 0x06, false),
    (false, false, (0x0, 0x8), (0xa, 0xf), 0x06, false),
    (false, true, (0x0, 0x8), (0xa, 0xf), 0x06, false),
    (false, false, (0xa, 0xf), (0x0, 0x9), 0x60, true),
    (true, false, (0x0, 0xf), (0x0, 0x9), 0x60, true),
    (true, true, (0x0, 0xf), (0x0, 0x9), 0x66, true),
    (true, false, (0x0, 0xf), (0xa, 0xf), 0x66, true),
    (true, true, (0x0, 0xf), (0xa, 0xf), 0x66, true),
    (false, false, (0x9, 0xf), (0xa, 0xf), 0x66, true),
    (false, true, (0x9, 0xf), (0xa, 0xf), 0x66, true),
    (false, true, (0xa, 0xf), (0x0, 0x9), 0x66, true),
];

/// (subtract flag, half-carry-in, low-nibble range) → resulting half-carry.
type HalfCarryRule = (bool, bool, (u8, u8), bool);

const HALF_CARRY: &[HalfCarryRule] = &[
    (false, false, (0x0, 0x9), false),
    (false, false, (0xa, 0xf), true),
    (false, true, (0x0, 0x9), false),
    (false, true, (0xa, 0xf), true),
    (true, false, (0x0, 0xf), false),
    (true, true, (0x6, 0xf), false),
    (true, true, (0x0, 0x5), true),
];

/// Apply DAA to `a` given the flags it carries in. `subtract` is the NF bit
/// (true after a subtraction-family instruction). Returns the corrected
/// accumulator plus the resulting carry and half-carry flags; the caller
/// derives S/Z/Y/X/P(V) from the returned byte the same way every other
/// 8-bit ALU result does.
pub fn correct(carry: bool, half_carry: bool, subtract: bool, a: u8) -> (u8, bool, bool) {
    let hn = high_nibble(a);
    let ln = low_nibble(a);

    let (corr, new_carry) = CORRECTIONS
        .iter()
        .find(|&&(cf, hf, high, low, _, _)| cf == carry && hf == half_carry && in_range(hn, high) && in_range(ln, low))
        .map(|&(_, _, _, _, corr, new_carry)| (corr, new_carry))
        .expect("DAA correction table is exhaustive over every (carry, half-carry, nibble) combination");

    let new_half_carry = HALF_CARRY
        .iter()
        .find(|&&(nf, hf, low, _)| nf == subtract && hf == half_carry && in_range(ln, low))
        .map(|&(_, _, _, res)| res)
        .expect("half-carry table is exhaustive over every (N, H, low-nibble) combination");

    let signed_corr = if subtract { (corr as i16).wrapping_neg() } else { corr as i16 };
    let result = ((a as i16 + signed_corr).rem_euclid(256)) as u8;

    (result, new_carry, new_half_carry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_correction_needed_for_a_valid_bcd_pair() {
        let (result, carry, _) = correct(false, false, false, 0x30);
        assert_eq!(result, 0x30);
        assert!(!carry);
    }

    #[test]
    fn low_nibble_overflow_adds_six() {
        let (result, carry, _) = correct(false, false, false, 0x0a);
        assert_eq!(result, 0x10);
        assert!(!carry);
    }

    #[test]
    fn high_nibble_overflow_adds_0x60_and_sets_carry() {
        let (result, carry, _) = correct(false, false, false, 0xa0);
        assert_eq!(result, 0x00);
        assert!(carry);
    }

    #[test]
    fn both_nibbles_overflow_adds_0x66() {
        let (result, carry, _) = correct(false, false, false, 0xaa);
        assert_eq!(result, 0x10);
        assert!(carry);
    }

    #[test]
    fn subtract_context_subtracts_the_correction() {
        // a=0x9a after "sub 0x01" style borrow context, CF set, HF clear.
        let (result, carry, _) = correct(true, false, true, 0x9a);
        assert_eq!(result, (0x9a_i16 - 0x60).rem_euclid(256) as u8);
        assert!(carry);
    }

    #[test]
    fn half_carry_set_with_a_valid_low_nibble_still_corrects() {
        // a=0x10 after "ld a,9; add a,7" (H set, C clear, low nibble already <=9).
        let (result, carry, half_carry) = correct(false, true, false, 0x10);
        assert_eq!(result, 0x16);
        assert!(!carry);
        assert!(!half_carry);
    }
}
