// SPDX-License-Identifier: Apache-2.0

//! Emits a signed sized literal `<width>'s<base><digits>` for an arbitrary bit
//! pattern, interprets it, and checks that re-encoding the decoded signed
//! value at `width` bits reproduces the stored pattern.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use xlsynth_netlist::netlist::number::{NumericLiteral, parse_numeric_literal};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum ArbBase {
    Bin,
    Oct,
    Dec,
    Hex,
}

#[derive(Debug, Clone, Arbitrary)]
struct ArbLiteral {
    width: u8,
    value: u64,
    base: ArbBase,
    uppercase: bool,
}

fn format_digits(value: u64, base: ArbBase) -> String {
    match base {
        ArbBase::Bin => format!("{:b}", value),
        ArbBase::Oct => format!("{:o}", value),
        ArbBase::Dec => format!("{}", value),
        ArbBase::Hex => format!("{:x}", value),
    }
}

fn base_char(base: ArbBase, uppercase: bool) -> char {
    let c = match base {
        ArbBase::Bin => 'b',
        ArbBase::Oct => 'o',
        ArbBase::Dec => 'd',
        ArbBase::Hex => 'h',
    };
    if uppercase { c.to_ascii_uppercase() } else { c }
}

fuzz_target!(|input: ArbLiteral| {
    let _ = env_logger::builder().is_test(true).try_init();

    let width = u32::from(input.width % 64) + 1;
    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    let pattern = input.value & mask;
    let text = format!(
        "{}'s{}{}",
        width,
        base_char(input.base, input.uppercase),
        format_digits(pattern, input.base)
    );

    let literal = parse_numeric_literal(&text).expect("generated literal should be valid");
    assert_eq!(literal.width(), width);
    assert_eq!(literal.to_u64(), Some(pattern), "{}", text);

    let decoded = literal.to_i64().expect("width <= 64 fits in i64");
    let reencoded = NumericLiteral::from_i64(width, true, decoded);
    assert_eq!(reencoded.bits(), literal.bits(), "{}", text);

    // The canonical spelling denotes the same literal.
    let canonical = parse_numeric_literal(&literal.to_string()).expect("canonical form parses");
    assert_eq!(canonical, literal);
});
