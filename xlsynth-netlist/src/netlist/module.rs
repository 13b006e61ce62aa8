// SPDX-License-Identifier: Apache-2.0

//! Parsed modules and the netlist that owns them.
//!
//! Modules are only mutated by the parser; once `endmodule` has been seen a
//! module is read-only and may be queried concurrently.

use std::collections::HashMap;

use crate::netlist::symbols::{
    Cell, Constant, Net, NetOrigin, NetRef, PortDirection, SymbolTable, parse_bus_element_name,
};
use crate::netlist_error::{DuplicateError, NotFoundError, NotFoundKind};

/// A name from the module header, with the direction and range attached by a
/// later declaration (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Option<PortDirection>,
    /// `(first, last)` bounds as written, e.g. `(2, 0)` for `[2:0]`.
    pub range: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module<'lib> {
    name: String,
    ports: Vec<Port>,
    symbols: SymbolTable<'lib>,
}

impl<'lib> Module<'lib> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ports: Vec::new(),
            symbols: SymbolTable::new(),
        }
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable<'lib> {
        &mut self.symbols
    }

    pub(crate) fn add_port(&mut self, name: &str) -> bool {
        if self.port(name).is_some() {
            return false;
        }
        self.ports.push(Port {
            name: name.to_string(),
            direction: None,
            range: None,
        });
        true
    }

    pub(crate) fn port_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.name == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn symbols(&self) -> &SymbolTable<'lib> {
        &self.symbols
    }

    pub fn resolve_net(&self, name: &str) -> Result<NetRef, NotFoundError> {
        self.symbols.resolve_net(name)
    }

    pub fn resolve_cell(&self, instance_name: &str) -> Result<&Cell<'lib>, NotFoundError> {
        self.symbols.resolve_cell(instance_name)
    }

    /// Finds a constant net created for a literal whose value, under the
    /// literal's own signedness, is `value`.
    pub fn resolve_number(&self, value: i64) -> Result<NetRef, NotFoundError> {
        self.symbols.resolve_number(value)
    }

    pub fn net(&self, net: NetRef) -> &Net {
        self.symbols.net(net)
    }

    pub fn nets(&self) -> &[Net] {
        self.symbols.nets()
    }

    pub fn cells(&self) -> &[Cell<'lib>] {
        self.symbols.cells()
    }

    pub fn constants(&self) -> &[Constant] {
        self.symbols.constants()
    }

    /// Declared (non-constant) elements of bus `base` in declaration order,
    /// i.e. most significant first for a `[high:low]` range.
    pub fn bus(&self, base: &str) -> Vec<NetRef> {
        self.symbols
            .iter_nets()
            .filter(|(_, net)| !matches!(net.origin(), NetOrigin::Constant { .. }))
            .filter(|(_, net)| parse_bus_element_name(net.name()).is_some_and(|(b, _)| b == base))
            .map(|(net_ref, _)| net_ref)
            .collect()
    }
}

/// All modules parsed from one source text, keyed by module name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist<'lib> {
    modules: Vec<Module<'lib>>,
    module_by_name: HashMap<String, usize>,
}

impl<'lib> Netlist<'lib> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_module(&mut self, module: Module<'lib>) -> Result<(), DuplicateError> {
        if self.module_by_name.contains_key(module.name()) {
            return Err(DuplicateError {
                what: "module",
                name: module.name().to_string(),
            });
        }
        self.module_by_name
            .insert(module.name().to_string(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.module_by_name.contains_key(name)
    }

    pub fn get_module(&self, name: &str) -> Result<&Module<'lib>, NotFoundError> {
        self.module_by_name
            .get(name)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| NotFoundError::new(NotFoundKind::Module, name))
    }

    /// Modules in source order.
    pub fn modules(&self) -> &[Module<'lib>] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
