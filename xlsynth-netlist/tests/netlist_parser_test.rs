// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use test_case::test_case;

use xlsynth_netlist::cell_library::{CellLibrary, CellLibraryEntry, fake_cell_library};
use xlsynth_netlist::netlist::module::Netlist;
use xlsynth_netlist::netlist::parse::{Parser, parse_netlist_str};
use xlsynth_netlist::netlist::scanner::Scanner;
use xlsynth_netlist::netlist::symbols::{NetOrigin, PortDirection};
use xlsynth_netlist::netlist_error::{NotFoundKind, ParseErrorKind};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse<'lib>(library: &'lib CellLibrary, text: &str) -> Netlist<'lib> {
    let mut scanner = Scanner::new(text);
    Parser::parse_netlist(library, &mut scanner).expect("netlist should parse")
}

#[test]
fn test_empty_module() {
    init_logger();
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module main(); endmodule");
    assert_eq!(netlist.len(), 1);
    let m = netlist.get_module("main").unwrap();
    assert_eq!(m.name(), "main");
    assert!(m.nets().is_empty());
    assert!(m.cells().is_empty());
}

#[test]
fn test_empty_module_with_comment() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "// Empty module\nmodule main(); endmodule");
    let m = netlist.get_module("main").unwrap();
    assert!(m.nets().is_empty());
    assert!(m.cells().is_empty());
}

#[test]
fn test_wire_multi_decl() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module main(); wire foo, bar, baz; endmodule");
    let m = netlist.get_module("main").unwrap();
    assert_eq!(m.nets().len(), 3);
    for name in ["foo", "bar", "baz"] {
        let net = m.resolve_net(name).unwrap();
        assert_eq!(m.net(net).name(), name);
        assert_eq!(m.net(net).origin(), NetOrigin::Wire);
    }
}

#[test]
fn test_inverter_module() {
    let lib = fake_cell_library();
    let text = r#"
module main(i, o);
  input i;
  output o;
  INV inv_0(.A(i), .ZN(o));
endmodule
"#;
    let netlist = parse(&lib, text);
    let m = netlist.get_module("main").unwrap();
    let i = m.resolve_net("i").unwrap();
    let o = m.resolve_net("o").unwrap();
    assert_eq!(m.net(i).origin(), NetOrigin::Port(PortDirection::Input));
    assert_eq!(m.net(o).origin(), NetOrigin::Port(PortDirection::Output));

    let cell = m.resolve_cell("inv_0").unwrap();
    assert_eq!(cell.name(), "inv_0");
    assert_eq!(cell.binding("A"), Some(i));
    assert_eq!(cell.binding("ZN"), Some(o));
    let entry = lib.lookup("INV").unwrap();
    assert!(std::ptr::eq(entry, cell.cell_library_entry()));
}

#[test]
fn test_aoi21_with_multi_bit_input() {
    let lib = fake_cell_library();
    let text = r#"
module main(i, o);
  input [2:0] i;
  output o;
  AOI21 aoi21_0(.A(i[2]), .B(i[1]), .C(i[0]), .ZN(o));
endmodule
"#;
    let netlist = parse(&lib, text);
    let m = netlist.get_module("main").unwrap();
    let cell = m.resolve_cell("aoi21_0").unwrap();
    for (pin, name) in [("A", "i[2]"), ("B", "i[1]"), ("C", "i[0]")] {
        let net = m.resolve_net(name).unwrap();
        assert_eq!(cell.binding(pin), Some(net));
        assert_eq!(m.net(net).name(), name);
    }
    let distinct: std::collections::HashSet<_> = ["i[2]", "i[1]", "i[0]"]
        .iter()
        .map(|n| m.resolve_net(n).unwrap())
        .collect();
    assert_eq!(distinct.len(), 3);

    let e = m.resolve_net("i[3]").unwrap_err();
    assert_eq!(e.what, NotFoundKind::Net);
    assert!(e.to_string().contains("Could not find net: i[3]"));
}

#[test]
fn test_bit_select_out_of_range_fails_parse() {
    let lib = fake_cell_library();
    let text = "module main(i, o);\n  input [2:0] i;\n  output o;\n  INV u0(.A(i[3]), .ZN(o));\nendmodule\n";
    let e = parse_netlist_str(&lib, text).unwrap_err();
    assert_eq!(e.kind, ParseErrorKind::UnknownNet);
    assert!(e.message.contains("Could not find net: i[3]"));
    assert_eq!(e.span.start.lineno, 4);
}

#[test]
fn test_number_formats() {
    let lib = fake_cell_library();
    let literals = [
        "10", "1'b1", "1'o1", "1'd1", "1'h1", "1'B1", "1'O1", "1'D1", "1'H1", "10'o777",
        "20'd100", "30'hbeef",
    ];
    let mut text = String::from("module main();\n");
    text.push_str(&format!(
        "  wire {};\n",
        (0..literals.len())
            .map(|i| format!("z{}", i))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    for (i, lit) in literals.iter().enumerate() {
        text.push_str(&format!("  INV inv_{}(.A({}), .ZN(z{}));\n", i, lit, i));
    }
    text.push_str("endmodule\n");

    let netlist = parse(&lib, &text);
    let m = netlist.get_module("main").unwrap();
    assert_eq!(m.cells().len(), literals.len());
    // The 1-bit spellings of one all share a single constant.
    let one = m.resolve_cell("inv_1").unwrap().binding("A").unwrap();
    for i in 2..=8 {
        let cell = m.resolve_cell(&format!("inv_{}", i)).unwrap();
        assert_eq!(cell.binding("A"), Some(one));
    }
    assert_eq!(m.net(one).constant_value(), Some(true));
    // 10'o777 binds bit 0 (set); 20'd100 binds bit 0 (clear).
    let a9 = m.resolve_cell("inv_9").unwrap().binding("A").unwrap();
    assert_eq!(m.net(a9).constant_value(), Some(true));
    let a10 = m.resolve_cell("inv_10").unwrap().binding("A").unwrap();
    assert_eq!(m.net(a10).constant_value(), Some(false));
}

#[test_case("1'b1", 1; "binary")]
#[test_case("1'o1", 1; "octal")]
#[test_case("8'd255", 255; "unsigned decimal")]
#[test_case("8'sd127", 127; "signed positive")]
#[test_case("8'sd255", -1; "signed minus one")]
#[test_case("8'sd253", -3; "signed minus three")]
fn test_more_number_formats(literal: &str, value: i64) {
    let lib = fake_cell_library();
    let text = format!(
        "module main();\n  wire z;\n  INV u0(.A({}), .ZN(z));\nendmodule\n",
        literal
    );
    let netlist = parse(&lib, &text);
    let m = netlist.get_module("main").unwrap();
    let net = m.resolve_number(value).unwrap();
    assert_eq!(m.resolve_cell("u0").unwrap().binding("A"), Some(net));
}

#[test]
fn test_resolve_number_not_found() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module main(); endmodule");
    let e = netlist
        .get_module("main")
        .unwrap()
        .resolve_number(5)
        .unwrap_err();
    assert_eq!(e.to_string(), "Could not find number: 5");
}

#[test]
fn test_constant_bits_are_msb_first() {
    let lib = fake_cell_library();
    let netlist = parse(
        &lib,
        "module main();\n  wire z;\n  INV u0(.A(4'b1010), .ZN(z));\nendmodule\n",
    );
    let m = netlist.get_module("main").unwrap();
    let constant = &m.constants()[0];
    let bits: Vec<bool> = constant
        .nets
        .iter()
        .map(|n| m.net(*n).constant_value().unwrap())
        .collect();
    assert_eq!(bits, vec![true, false, true, false]);
}

#[test]
fn test_get_module_not_found() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module a(); endmodule\nmodule b(); endmodule\n");
    assert_eq!(netlist.len(), 2);
    assert!(netlist.get_module("b").is_ok());
    let e = netlist.get_module("c").unwrap_err();
    assert_eq!(e.to_string(), "Could not find module: c");
}

#[test]
fn test_resolve_cell_not_found() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module main(); endmodule");
    let e = netlist
        .get_module("main")
        .unwrap()
        .resolve_cell("u9")
        .unwrap_err();
    assert_eq!(e.to_string(), "Could not find cell: u9");
}

#[test]
fn test_custom_library_entry_identity() {
    let mut lib = CellLibrary::new();
    lib.add_entry(CellLibraryEntry::new("TIEHI", &[], &[("Y", "1")]))
        .unwrap();
    let netlist = parse(
        &lib,
        "module main(y);\n  output y;\n  TIEHI t0(.Y(y));\n  TIEHI t1(.Y());\nendmodule\n",
    );
    let m = netlist.get_module("main").unwrap();
    let t0 = m.resolve_cell("t0").unwrap().cell_library_entry();
    let t1 = m.resolve_cell("t1").unwrap().cell_library_entry();
    assert!(std::ptr::eq(t0, t1));
    assert!(std::ptr::eq(t0, lib.lookup("TIEHI").unwrap()));
}

#[test]
fn test_reparse_is_idempotent() {
    let lib = fake_cell_library();
    let text = r#"
module main(a, b, y);
  input [1:0] a;
  input b;
  output y;
  wire n;
  AOI21 u0(.A(a[1]), .B(a[0]), .C(b), .ZN(n));
  INV u1(.A(n), .ZN(y));
endmodule
"#;
    let first = parse(&lib, text);
    let second = parse(&lib, text);
    assert_eq!(first, second);
    let m1 = first.get_module("main").unwrap();
    let m2 = second.get_module("main").unwrap();
    assert!(!std::ptr::eq(m1, m2));
}

#[test]
fn test_concurrent_parses_share_library() {
    let lib = fake_cell_library();
    let texts: Vec<String> = (0..4)
        .map(|i| {
            format!(
                "module m{i}(a, y);\n  input a;\n  output y;\n  INV u0(.A(a), .ZN(y));\nendmodule\n"
            )
        })
        .collect();
    std::thread::scope(|s| {
        let handles: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let lib = &lib;
                s.spawn(move || {
                    let netlist = parse(lib, text);
                    let m = netlist.get_module(&format!("m{}", i)).unwrap();
                    let cell = m.resolve_cell("u0").unwrap();
                    std::ptr::eq(cell.cell_library_entry(), lib.lookup("INV").unwrap())
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    });
}

#[test]
fn test_concurrent_reads_of_finished_module() {
    let lib = fake_cell_library();
    let netlist = parse(
        &lib,
        "module main(i, o);\n  input [7:0] i;\n  output o;\n  INV u0(.A(i[3]), .ZN(o));\nendmodule\n",
    );
    let m = netlist.get_module("main").unwrap();
    std::thread::scope(|s| {
        for idx in 0..8 {
            s.spawn(move || {
                let name = format!("i[{}]", idx);
                assert_eq!(m.net(m.resolve_net(&name).unwrap()).name(), name);
                assert!(m.resolve_cell("u0").is_ok());
            });
        }
    });
}

#[test]
fn test_block_comments_and_escaped_identifiers() {
    let lib = fake_cell_library();
    let text = r#"
/* header
   comment */
module main(\a$b , o);
  input \a$b ;
  output o;
  INV /* inline */ u0(.A(\a$b ), .ZN(o));
endmodule
"#;
    let netlist = parse(&lib, text);
    let m = netlist.get_module("main").unwrap();
    let a = m.resolve_net("a$b").unwrap();
    assert_eq!(m.resolve_cell("u0").unwrap().binding("A"), Some(a));
}

#[test]
fn test_ascending_wire_range() {
    let lib = fake_cell_library();
    let netlist = parse(&lib, "module main();\n  wire [0:2] w;\nendmodule\n");
    let m = netlist.get_module("main").unwrap();
    let names: Vec<&str> = m.nets().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["w[0]", "w[1]", "w[2]"]);
}

#[test]
fn test_unknown_cell_type_render() {
    let lib = fake_cell_library();
    let text = "module main();\n  NOT_A_CELL u0();\nendmodule\n";
    let e = parse_netlist_str(&lib, text).unwrap_err();
    assert_eq!(e.kind, ParseErrorKind::UnknownCellType);
    assert_eq!(
        e.render(text),
        "unknown cell type: cell type 'NOT_A_CELL' is not in the cell library @ 2:3..2:13\n  NOT_A_CELL u0();\n  ^"
    );
}

#[test]
fn test_malformed_literal_digit_for_base() {
    let lib = fake_cell_library();
    let e = parse_netlist_str(
        &lib,
        "module main();\n  wire z;\n  INV u0(.A(3'o8), .ZN(z));\nendmodule\n",
    )
    .unwrap_err();
    assert_eq!(e.kind, ParseErrorKind::MalformedLiteral);
    assert!(e.message.contains("not valid in base 8"), "{}", e.message);
}

#[test]
fn test_zero_width_literal_rejected() {
    let lib = fake_cell_library();
    let e = parse_netlist_str(
        &lib,
        "module main();\n  wire z;\n  INV u0(.A(0'd1), .ZN(z));\nendmodule\n",
    )
    .unwrap_err();
    assert_eq!(e.kind, ParseErrorKind::MalformedLiteral);
}

#[test]
fn test_error_aborts_whole_parse() {
    let lib = fake_cell_library();
    let e = parse_netlist_str(
        &lib,
        "module ok(); endmodule\nmodule bad(); wire a; wire a; endmodule\n",
    )
    .unwrap_err();
    assert_eq!(e.kind, ParseErrorKind::DuplicateDeclaration);
    assert_eq!(e.message, "duplicate net declaration: a");
}
