// SPDX-License-Identifier: Apache-2.0

//! Interpretation of Verilog-style numeric literals.
//!
//! Two forms are accepted:
//!
//! - sized: `<width>'[s]<base><digits>`, e.g. `8'sd255`, `30'hbeef`;
//! - bare: a plain decimal digit sequence, e.g. `10`.
//!
//! The digit sequence is read as an unsigned integer of arbitrary magnitude
//! and then wrapped to exactly `width` bits. Signedness is only a view on the
//! stored bit pattern: `8'sd255` and `8'd255` hold the same bits but read back
//! as `-1` and `255` respectively.
//!
//! Bare literals are unsigned and take the width `max(32, bits needed)` so the
//! written value is always represented exactly.

use std::fmt;

use bitvec::prelude::*;
use num_bigint::BigUint;

use crate::netlist_error::LiteralError;

pub type LiteralBits = BitVec<u64, Lsb0>;

/// Width given to bare decimal literals whose value fits in it.
pub const BARE_LITERAL_MIN_WIDTH: u32 = 32;

/// Largest width accepted for a sized literal or a declared range; each bit
/// becomes a net.
pub const MAX_LITERAL_WIDTH: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'b' => Some(Radix::Binary),
            'o' => Some(Radix::Octal),
            'd' => Some(Radix::Decimal),
            'h' => Some(Radix::Hex),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericLiteral {
    width: u32,
    is_signed: bool,
    /// Exactly `width` bits, least significant bit at index 0.
    bits: LiteralBits,
}

/// Reads `digits` in `radix` as an unsigned magnitude; `_` separators are
/// skipped.
fn parse_magnitude(digits: &str, radix: Radix) -> Result<LiteralBits, LiteralError> {
    let mut cleaned = String::with_capacity(digits.len());
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        if matches!(c, 'x' | 'X' | 'z' | 'Z' | '?') {
            return Err(LiteralError(format!(
                "unknown/high-impedance digit '{}' in {:?} is not supported",
                c, digits
            )));
        }
        if !c.is_digit(radix.value()) {
            return Err(LiteralError(format!(
                "digit '{}' is not valid in base {} (in {:?})",
                c,
                radix.value(),
                digits
            )));
        }
        cleaned.push(c);
    }
    if cleaned.is_empty() {
        return Err(LiteralError(format!("no digits in {:?}", digits)));
    }
    let magnitude = BigUint::parse_bytes(cleaned.as_bytes(), radix.value()).ok_or_else(|| {
        LiteralError(format!(
            "cannot read {:?} as a base {} number",
            digits,
            radix.value()
        ))
    })?;
    Ok(LiteralBits::from_vec(magnitude.to_u64_digits()))
}

impl NumericLiteral {
    /// Builds a literal holding `value` in two's complement, wrapped to
    /// `width` bits.
    pub fn from_i64(width: u32, is_signed: bool, value: i64) -> Self {
        let mut bits = LiteralBits::repeat(value < 0, width as usize);
        if width > 0 {
            bits[..(width as usize).min(64)].store_le(value as u64);
        }
        Self {
            width,
            is_signed,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    pub fn bits(&self) -> &BitSlice<u64, Lsb0> {
        &self.bits
    }

    /// Value of bit `index`, where index 0 is the least significant bit.
    pub fn bit(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Bits from most to least significant.
    pub fn msb_first(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().rev().map(|b| *b)
    }

    fn sign_bit(&self) -> bool {
        self.is_signed
            && self
                .width
                .checked_sub(1)
                .is_some_and(|msb| self.bit(msb as usize))
    }

    /// Integer value under this literal's signedness, if it fits in `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        let w = self.width as usize;
        if w == 0 {
            return Some(0);
        }
        let sign = self.sign_bit();
        if w > 64 && self.bits[64..].iter().any(|b| *b != sign) {
            return None;
        }
        let low: u64 = self.bits[..w.min(64)].load_le();
        if w < 64 {
            let extended = if sign { low | (!0u64 << w) } else { low };
            return Some(extended as i64);
        }
        // Unsigned values above i64::MAX and signed values whose bit 63 is
        // not a sign extension do not fit.
        if (low >> 63 == 1) != sign {
            return None;
        }
        Some(low as i64)
    }

    /// Unsigned reading of the raw bit pattern, if it fits in `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        let w = self.width as usize;
        if w == 0 {
            return Some(0);
        }
        if w > 64 && self.bits[64..].any() {
            return None;
        }
        Some(self.bits[..w.min(64)].load_le())
    }
}

impl fmt::Display for NumericLiteral {
    /// Canonical form: `<width>'[s]h<hex>` without leading zero digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self
            .bits
            .chunks(4)
            .rev()
            .map(|nibble| std::char::from_digit(nibble.load_le::<u32>(), 16).unwrap_or('0'))
            .collect();
        let trimmed = digits.trim_start_matches('0');
        let hex = if trimmed.is_empty() { "0" } else { trimmed };
        write!(
            f,
            "{}'{}h{}",
            self.width,
            if self.is_signed { "s" } else { "" },
            hex
        )
    }
}

/// Parses literal text (as produced by the scanner's `Number` token) into a
/// `NumericLiteral`.
pub fn parse_numeric_literal(text: &str) -> Result<NumericLiteral, LiteralError> {
    let Some((width_text, rest)) = text.split_once('\'') else {
        let mut bits = parse_magnitude(text, Radix::Decimal)?;
        let needed = bits.last_one().map_or(0, |i| i + 1);
        let width = needed.max(BARE_LITERAL_MIN_WIDTH as usize);
        bits.resize(width, false);
        return Ok(NumericLiteral {
            width: width as u32,
            is_signed: false,
            bits,
        });
    };

    let width_digits: String = width_text.chars().filter(|c| *c != '_').collect();
    if width_digits.is_empty() || !width_digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(LiteralError(format!(
            "invalid width {:?} in {:?}",
            width_text, text
        )));
    }
    let width: u32 = width_digits
        .parse()
        .map_err(|_| LiteralError(format!("width too large in {:?}", text)))?;
    if width == 0 {
        return Err(LiteralError(format!(
            "width must be positive in {:?}",
            text
        )));
    }
    if width > MAX_LITERAL_WIDTH {
        return Err(LiteralError(format!(
            "width {} exceeds maximum {} in {:?}",
            width, MAX_LITERAL_WIDTH, text
        )));
    }

    let mut chars = rest.chars();
    let mut is_signed = false;
    let mut base_char = chars.next();
    if matches!(base_char, Some('s' | 'S')) {
        is_signed = true;
        base_char = chars.next();
    }
    let radix = base_char
        .and_then(Radix::from_char)
        .ok_or_else(|| LiteralError(format!("missing base specifier in {:?}", text)))?;

    let mut bits = parse_magnitude(chars.as_str(), radix)?;
    bits.resize(width as usize, false);
    Ok(NumericLiteral {
        width,
        is_signed,
        bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("8'sd127", 127)]
    #[test_case("8'sd255", -1)]
    #[test_case("8'sd253", -3)]
    #[test_case("8'd255", 255)]
    #[test_case("1'b1", 1)]
    #[test_case("1'o1", 1)]
    #[test_case("1'd1", 1)]
    #[test_case("1'h1", 1)]
    #[test_case("1'B1", 1)]
    #[test_case("1'O1", 1)]
    #[test_case("1'D1", 1)]
    #[test_case("1'H1", 1)]
    #[test_case("10'o777", 511)]
    #[test_case("20'd100", 100)]
    #[test_case("30'hbeef", 0xbeef)]
    #[test_case("8'SHff", -1)]
    #[test_case("4'b1_0_1_0", 10)]
    #[test_case("10", 10)]
    fn test_literal_value(text: &str, want: i64) {
        let lit = parse_numeric_literal(text).expect("valid literal");
        assert_eq!(lit.to_i64(), Some(want), "literal {}", text);
    }

    #[test]
    fn test_sized_literal_wraps_to_width() {
        let lit = parse_numeric_literal("4'hff").unwrap();
        assert_eq!(lit.width(), 4);
        assert_eq!(lit.bits().len(), 4);
        assert_eq!(lit.to_u64(), Some(0xf));

        let lit = parse_numeric_literal("3'd9").unwrap();
        assert_eq!(lit.to_u64(), Some(1));
    }

    #[test]
    fn test_huge_magnitude_wraps() {
        // 2^80 + 5 does not fit in any machine word; only the low bits survive.
        let lit = parse_numeric_literal("8'd1208925819614629174706181").unwrap();
        assert_eq!(lit.to_u64(), Some(5));
    }

    #[test]
    fn test_signedness_is_a_view() {
        let signed = parse_numeric_literal("8'sd253").unwrap();
        let unsigned = parse_numeric_literal("8'd253").unwrap();
        assert_eq!(signed.bits(), unsigned.bits());
        assert_eq!(signed.to_i64(), Some(-3));
        assert_eq!(unsigned.to_i64(), Some(253));
    }

    #[test]
    fn test_bare_literal_width_policy() {
        let lit = parse_numeric_literal("10").unwrap();
        assert_eq!(lit.width(), BARE_LITERAL_MIN_WIDTH);
        assert!(!lit.is_signed());

        let lit = parse_numeric_literal("18446744073709551616").unwrap();
        assert_eq!(lit.width(), 65);
        assert_eq!(lit.to_i64(), None);
        assert!(lit.bit(64));
    }

    #[test]
    fn test_msb_first_order() {
        let lit = parse_numeric_literal("4'b1100").unwrap();
        let bits: Vec<bool> = lit.msb_first().collect();
        assert_eq!(bits, vec![true, true, false, false]);
    }

    #[test]
    fn test_wide_signed_values() {
        let lit = parse_numeric_literal("100'sh_f_ffff_ffff_ffff_ffff_ffff_fffe").unwrap();
        assert_eq!(lit.to_i64(), Some(-2));
        let lit = parse_numeric_literal("64'hffffffffffffffff").unwrap();
        assert_eq!(lit.to_i64(), None);
        assert_eq!(lit.to_u64(), Some(u64::MAX));
        let lit = parse_numeric_literal("64'shffffffffffffffff").unwrap();
        assert_eq!(lit.to_i64(), Some(-1));
    }

    #[test]
    fn test_signed_round_trip() {
        for width in [1u32, 2, 3, 7, 8, 13, 32, 63, 64, 65, 100] {
            for value in [0i64, 1, -1, 3, -3, 127, -128, 255, i64::MAX, i64::MIN] {
                let lit = NumericLiteral::from_i64(width, true, value);
                let decoded = lit.to_i64().expect("signed literal fits in i64");
                let reencoded = NumericLiteral::from_i64(width, true, decoded);
                assert_eq!(reencoded.bits(), lit.bits(), "width {} value {}", width, value);
            }
        }
    }

    #[test_case("0'd1", "width must be positive")]
    #[test_case("4'b102", "not valid in base 2")]
    #[test_case("4'o8", "not valid in base 8")]
    #[test_case("4'hg", "not valid in base 16")]
    #[test_case("4'bx1", "not supported")]
    #[test_case("4'b__", "no digits")]
    #[test_case("4'q1", "missing base specifier")]
    #[test_case("99999999999'd1", "width too large")]
    #[test_case("65537'd1", "exceeds maximum")]
    fn test_malformed_literal(text: &str, want: &str) {
        let e = parse_numeric_literal(text).unwrap_err();
        assert!(e.0.contains(want), "{} -> {}", text, e);
    }

    #[test]
    fn test_display_is_canonical_hex() {
        assert_eq!(parse_numeric_literal("8'sd255").unwrap().to_string(), "8'shff");
        assert_eq!(parse_numeric_literal("1'b0").unwrap().to_string(), "1'h0");
        assert_eq!(parse_numeric_literal("10'o777").unwrap().to_string(), "10'h1ff");
        assert_eq!(parse_numeric_literal("12'h0f").unwrap().to_string(), "12'hf");
    }
}
