// SPDX-License-Identifier: Apache-2.0

//! Generators for large synthetic netlists, used by the parser benchmark.
//!
//! Output only uses cells from `fake_cell_library`.

use std::fmt::Write as FmtWrite;

/// Generates a single module `top` with a chain of `instance_count` `INV`
/// instances between scalar ports `a` and `y`:
///
/// ```text
///   a -> INV u0 -> n0 -> INV u1 -> n1 -> ... -> INV u{N-1} -> y
/// ```
///
/// An `instance_count` of zero yields a module that declares the ports and
/// nothing else.
pub fn make_chain_netlist(instance_count: usize) -> String {
    let mut s = String::new();
    writeln!(&mut s, "module top (a, y);").unwrap();
    writeln!(&mut s, "  input a;").unwrap();
    writeln!(&mut s, "  output y;").unwrap();
    for i in 0..instance_count.saturating_sub(1) {
        writeln!(&mut s, "  wire n{};", i).unwrap();
    }
    for i in 0..instance_count {
        let input_net = if i == 0 {
            "a".to_string()
        } else {
            format!("n{}", i - 1)
        };
        let output_net = if i + 1 == instance_count {
            "y".to_string()
        } else {
            format!("n{}", i)
        };
        writeln!(
            &mut s,
            "  INV u{} (.A({}), .ZN({}));",
            i, input_net, output_net
        )
        .unwrap();
    }
    writeln!(&mut s, "endmodule").unwrap();
    s
}

/// Generates a module `top` whose cells are all tied to literal constants,
/// exercising literal interpretation and constant-net sharing.
pub fn make_constant_fanout_netlist(instance_count: usize) -> String {
    let mut s = String::new();
    writeln!(&mut s, "module top ();").unwrap();
    for i in 0..instance_count {
        writeln!(&mut s, "  wire z{};", i).unwrap();
    }
    for i in 0..instance_count {
        writeln!(
            &mut s,
            "  AND u{} (.A(8'd{}), .B(1'b1), .Z(z{}));",
            i,
            i % 256,
            i
        )
        .unwrap();
    }
    writeln!(&mut s, "endmodule").unwrap();
    s
}
