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

//! Low-level, position-addressable scanning over a single source line.
//! Every method here is a pure function of `(text, pos)` — no mutable
//! cursor state beyond the position the caller threads through — which is
//! what lets the parselets above memoize on `(OperandKind, position)`.

/// Skip spaces and tabs starting at `pos`, returning the new position.
pub fn skip_ws(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut p = pos;
    while p < bytes.len() && (bytes[p] == b' ' || bytes[p] == b'\t') {
        p += 1;
    }
    p
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}
fn is_ident_cont(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Recognize `[a-zA-Z_][a-zA-Z0-9_]*` at `pos`. Case is preserved; callers
/// lowercase it themselves when matching a case-insensitive keyword.
pub fn scan_identifier(text: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if pos >= bytes.len() || !is_ident_start(bytes[pos]) {
        return None;
    }
    let mut end = pos + 1;
    while end < bytes.len() && is_ident_cont(bytes[end]) {
        end += 1;
    }
    Some((&text[pos..end], end))
}

/// Match a case-insensitive keyword at `pos`, requiring a non-identifier
/// character (or end of input) immediately after so `"ixy"` never matches
/// `"ix"`.
pub fn match_keyword(text: &str, pos: usize, kw: &str) -> Option<usize> {
    let (ident, end) = scan_identifier(text, pos)?;
    if ident.eq_ignore_ascii_case(kw) {
        Some(end)
    } else {
        None
    }
}

/// Match a fixed punctuation string (`"("`, `","`, `"+"`, ...) with no
/// boundary requirement.
pub fn match_literal(text: &str, pos: usize, lit: &str) -> Option<usize> {
    if text[pos..].starts_with(lit) {
        Some(pos + lit.len())
    } else {
        None
    }
}

/// Parse an optional leading `+`/`-` sign, returning the multiplier and the
/// position after it (unchanged position if no sign was present).
pub fn scan_sign(text: &str, pos: usize) -> (i64, usize) {
    match text.as_bytes().get(pos) {
        Some(b'+') => (1, pos + 1),
        Some(b'-') => (-1, pos + 1),
        _ => (1, pos),
    }
}

/// Integer literal: optional sign, then base-prefixed or decimal digits.
/// `0x` hex, `0b` binary (underscores allowed as digit separators), `0o`
/// octal, otherwise decimal. Returns the unsigned magnitude and the sign
/// already folded in.
pub fn scan_integer(text: &str, pos: usize) -> Option<(i64, usize)> {
    let (sign, p) = scan_sign(text, pos);
    let bytes = text.as_bytes();
    let rest = &text[p..];
    let (digits_start, radix, allow_underscore) = if rest.len() >= 2 && &rest[..2] == "0x" {
        (p + 2, 16, false)
    } else if rest.len() >= 2 && &rest[..2] == "0b" {
        (p + 2, 2, true)
    } else if rest.len() >= 2 && &rest[..2] == "0o" {
        (p + 2, 8, false)
    } else {
        (p, 10, false)
    };
    let mut end = digits_start;
    let mut digits = String::new();
    while end < bytes.len() {
        let c = bytes[end] as char;
        if c == '_' && allow_underscore {
            end += 1;
            continue;
        }
        if c.is_digit(radix) {
            digits.push(c);
            end += 1;
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(&digits, radix).ok()?;
    Some((sign * magnitude, end))
}

fn escape_byte(c: char) -> Option<u8> {
    match c {
        'n' => Some(b'\n'),
        'r' => Some(b'\r'),
        't' => Some(b'\t'),
        '0' => Some(0),
        '\\' => Some(b'\\'),
        '\'' => Some(b'\''),
        '"' => Some(b'"'),
        _ => None,
    }
}

/// `'c'` with `\n \r \t \0 \\ \' \"` escapes. Returns the byte value.
pub fn scan_char_literal(text: &str, pos: usize) -> Option<(u8, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b'\'') {
        return None;
    }
    let mut p = pos + 1;
    let value = if bytes.get(p) == Some(&b'\\') {
        let esc = *bytes.get(p + 1)? as char;
        let v = escape_byte(esc)?;
        p += 2;
        v
    } else {
        let c = *bytes.get(p)?;
        p += 1;
        c
    };
    if bytes.get(p) != Some(&b'\'') {
        return None;
    }
    Some((value, p + 1))
}

/// `"…"` with the same escape set as char literals.
pub fn scan_string_literal(text: &str, pos: usize) -> Option<(Vec<u8>, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b'"') {
        return None;
    }
    let mut p = pos + 1;
    let mut out = Vec::new();
    loop {
        match bytes.get(p) {
            None => return None,
            Some(b'"') => return Some((out, p + 1)),
            Some(b'\\') => {
                let esc = *bytes.get(p + 1)? as char;
                out.push(escape_byte(esc)?);
                p += 2;
            }
            Some(&c) => {
                out.push(c);
                p += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_in_every_base() {
        assert_eq!(scan_integer("0x1F", 0), Some((31, 4)));
        assert_eq!(scan_integer("0b1010_1010", 0), Some((0xAA, 11)));
        assert_eq!(scan_integer("0o17", 0), Some((15, 4)));
        assert_eq!(scan_integer("-42", 0), Some((-42, 3)));
        assert_eq!(scan_integer("255", 0), Some((255, 3)));
    }

    #[test]
    fn identifier_respects_word_boundary() {
        assert_eq!(match_keyword("ixy", 0, "ix"), None);
        assert_eq!(match_keyword("ix+3", 0, "ix"), Some(2));
        assert_eq!(match_keyword("IX", 0, "ix"), Some(2));
    }

    #[test]
    fn string_literal_decodes_escapes() {
        assert_eq!(scan_string_literal("\"a\\nb\"", 0), Some((vec![b'a', b'\n', b'b'], 6)));
    }

    #[test]
    fn char_literal_decodes_escape() {
        assert_eq!(scan_char_literal("'\\t'", 0), Some((b'\t', 4)));
        assert_eq!(scan_char_literal("'C'", 0), Some((b'C', 3)));
    }
}
