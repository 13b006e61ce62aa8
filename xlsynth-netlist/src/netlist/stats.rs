// SPDX-License-Identifier: Apache-2.0

//! Compute summary statistics for parsed netlists.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::cell_library::CellLibrary;
use crate::netlist::io::read_netlist_text;
use crate::netlist::module::Netlist;
use crate::netlist::parse::{ParseOptions, Parser};
use crate::netlist::scanner::Scanner;
use crate::netlist::symbols::NetOrigin;

/// Summary statistics for a parsed netlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetlistStats {
    pub num_modules: usize,
    pub num_instances: usize,
    /// Declared, implicit, and port nets; constant nets are counted apart.
    pub num_nets: usize,
    pub num_constant_nets: usize,
    /// `(cell type, count)` by descending count, then name.
    pub cell_counts: Vec<(String, usize)>,
}

impl NetlistStats {
    pub fn from_netlist(netlist: &Netlist) -> Self {
        let mut num_instances = 0;
        let mut num_nets = 0;
        let mut num_constant_nets = 0;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for m in netlist.modules() {
            num_instances += m.cells().len();
            for net in m.nets() {
                match net.origin() {
                    NetOrigin::Constant { .. } => num_constant_nets += 1,
                    _ => num_nets += 1,
                }
            }
            for cell in m.cells() {
                *counts
                    .entry(cell.cell_library_entry().type_name())
                    .or_insert(0) += 1;
            }
        }
        let mut cell_counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        cell_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        NetlistStats {
            num_modules: netlist.len(),
            num_instances,
            num_nets,
            num_constant_nets,
            cell_counts,
        }
    }
}

/// Reads and parses the netlist at `path`, returning its statistics and the
/// time spent parsing (excluding file I/O).
pub fn read_netlist_stats(
    path: &Path,
    library: &CellLibrary,
    options: ParseOptions,
) -> Result<(NetlistStats, Duration)> {
    let text = read_netlist_text(path)?;
    let mut scanner = Scanner::new(&text);
    let start = Instant::now();
    let netlist = Parser::parse_netlist_with_options(library, &mut scanner, options)
        .map_err(|e| anyhow!(e.render(&text)))?;
    let parse_duration = start.elapsed();
    Ok((NetlistStats::from_netlist(&netlist), parse_duration))
}
