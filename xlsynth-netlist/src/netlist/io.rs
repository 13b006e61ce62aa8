// SPDX-License-Identifier: Apache-2.0

//! Reading netlists from disk, plain (`.gv`, `.v`) or gzipped (`.gz`).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use flate2::read::MultiGzDecoder;

use crate::cell_library::CellLibrary;
use crate::netlist::module::Netlist;
use crate::netlist::parse::{ParseOptions, Parser};
use crate::netlist::scanner::Scanner;

/// Reads the full text of the netlist at `path`, decompressing when the
/// extension is `gz`.
pub fn read_netlist_text(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("opening netlist '{}'", path.display()))?;
    let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);
    let mut reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("reading netlist '{}'", path.display()))?;
    Ok(text)
}

/// Parses the netlist at `path` against `library`. Parse errors are reported
/// with the offending source line and a caret under the failing column.
pub fn parse_netlist_from_path<'lib>(
    path: &Path,
    library: &'lib CellLibrary,
    options: ParseOptions,
) -> Result<Netlist<'lib>> {
    let text = read_netlist_text(path)?;
    let mut scanner = Scanner::new(&text);
    let netlist = Parser::parse_netlist_with_options(library, &mut scanner, options)
        .map_err(|e| anyhow!("{}: {}", path.display(), e.render(&text)))?;
    log::info!(
        "parsed {} module(s) from '{}'",
        netlist.len(),
        path.display()
    );
    Ok(netlist)
}
