// SPDX-License-Identifier: Apache-2.0

//! Parser for flat, structural gate-level netlists written in a restricted
//! Verilog subset, checked against a cell library.

pub mod cell_library;
pub mod netlist;
pub mod netlist_error;

pub use cell_library::{CellLibrary, CellLibraryEntry};
pub use netlist::module::{Module, Netlist};
pub use netlist::parse::{ParseOptions, Parser, parse_netlist_str};
pub use netlist::scanner::Scanner;
pub use netlist_error::{NotFoundError, ParseError, ParseErrorKind};
