// SPDX-License-Identifier: Apache-2.0

pub mod bench_synth_netlist;
pub mod io;
pub mod module;
pub mod number;
pub mod parse;
pub mod scanner;
pub mod stats;
pub mod symbols;
