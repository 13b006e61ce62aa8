// SPDX-License-Identifier: Apache-2.0

//! Cell library consulted by the netlist parser.
//!
//! The parser only ever looks entries up by cell type name and keeps shared
//! references to them, so a `CellLibrary` must outlive every `Netlist` built
//! against it. Libraries are immutable once built and can be shared across
//! threads parsing independent netlists.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPin {
    pub name: String,
    /// Boolean function of the input pins, e.g. `"!(A & B)"`.
    #[serde(default)]
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLibraryEntry {
    #[serde(rename = "name")]
    type_name: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<OutputPin>,
}

impl CellLibraryEntry {
    pub fn new(type_name: &str, inputs: &[&str], outputs: &[(&str, &str)]) -> Self {
        Self {
            type_name: type_name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs
                .iter()
                .map(|(name, function)| OutputPin {
                    name: name.to_string(),
                    function: function.to_string(),
                })
                .collect(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn input_pin_names(&self) -> &[String] {
        &self.inputs
    }

    pub fn output_pins(&self) -> &[OutputPin] {
        &self.outputs
    }

    pub fn output_pin_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.outputs.iter().map(|p| p.name.as_str())
    }

    pub fn pin_direction(&self, pin: &str) -> Option<PinDirection> {
        if self.inputs.iter().any(|p| p == pin) {
            Some(PinDirection::Input)
        } else if self.outputs.iter().any(|p| p.name == pin) {
            Some(PinDirection::Output)
        } else {
            None
        }
    }

    pub fn has_pin(&self, pin: &str) -> bool {
        self.pin_direction(pin).is_some()
    }

    fn check_pins_unique(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for pin in self
            .inputs
            .iter()
            .map(|s| s.as_str())
            .chain(self.output_pin_names())
        {
            if !seen.insert(pin) {
                return Err(anyhow!(
                    "cell '{}' declares pin '{}' more than once",
                    self.type_name,
                    pin
                ));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CellLibraryFile {
    cells: Vec<CellLibraryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellLibrary {
    entries: HashMap<String, CellLibraryEntry>,
}

impl CellLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: CellLibraryEntry) -> Result<()> {
        entry.check_pins_unique()?;
        if self.entries.contains_key(&entry.type_name) {
            return Err(anyhow!(
                "cell library already has an entry for '{}'",
                entry.type_name
            ));
        }
        self.entries.insert(entry.type_name.clone(), entry);
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Option<&CellLibraryEntry> {
        self.entries.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by type name.
    pub fn entries(&self) -> Vec<&CellLibraryEntry> {
        let mut v: Vec<&CellLibraryEntry> = self.entries.values().collect();
        v.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        v
    }

    /// Builds a library from JSON of the form
    /// `{"cells": [{"name": "INV", "inputs": ["A"], "outputs": [{"name": "ZN", "function": "!A"}]}]}`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: CellLibraryFile =
            serde_json::from_str(text).context("parsing cell library JSON")?;
        let mut lib = CellLibrary::new();
        for entry in file.cells {
            lib.add_entry(entry)?;
        }
        log::debug!("loaded cell library with {} entries", lib.len());
        Ok(lib)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading cell library '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("loading cell library '{}'", path.display()))
    }
}

/// Small library of common combinational and sequential cells, used by tests
/// and as the CLI default.
pub fn fake_cell_library() -> CellLibrary {
    let entries = [
        CellLibraryEntry::new("INV", &["A"], &[("ZN", "!A")]),
        CellLibraryEntry::new("BUF", &["A"], &[("Z", "A")]),
        CellLibraryEntry::new("AND", &["A", "B"], &[("Z", "A&B")]),
        CellLibraryEntry::new("NAND", &["A", "B"], &[("ZN", "!(A&B)")]),
        CellLibraryEntry::new("OR", &["A", "B"], &[("Z", "A|B")]),
        CellLibraryEntry::new("NOR", &["A", "B"], &[("ZN", "!(A|B)")]),
        CellLibraryEntry::new("XOR", &["A", "B"], &[("Z", "A^B")]),
        CellLibraryEntry::new("AOI21", &["A", "B", "C"], &[("ZN", "!((A&B)|C)")]),
        CellLibraryEntry::new("DFF", &["D", "CLK"], &[("Q", "D")]),
    ];
    let mut lib = CellLibrary::new();
    for entry in entries {
        lib.add_entry(entry).expect("fake cell library entries are distinct");
    }
    lib
}
