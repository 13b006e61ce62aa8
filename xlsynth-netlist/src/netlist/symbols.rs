// SPDX-License-Identifier: Apache-2.0

//! Per-module symbol table: owns the nets and cell instances of one module.
//!
//! Nets are addressed by string name. A ranged declaration such as
//! `input [2:0] i;` produces the scalar nets `i[2]`, `i[1]`, `i[0]` (in that
//! order); `bus_element_name` is the single place that spells this
//! convention.
//!
//! Numeric literals used as connections are realized as constant nets, one per
//! bit, most significant bit first. Identical literals share their nets.

use std::collections::HashMap;

use crate::cell_library::CellLibraryEntry;
use crate::netlist::number::NumericLiteral;
use crate::netlist_error::{DuplicateError, NotFoundError, NotFoundKind};

/// Name of element `index` of bus `base`, e.g. `i[2]`.
pub fn bus_element_name(base: &str, index: u32) -> String {
    format!("{}[{}]", base, index)
}

/// Inverse of `bus_element_name`: splits `i[2]` into `("i", 2)`.
pub fn parse_bus_element_name(name: &str) -> Option<(&str, u32)> {
    let inner = name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (base, index) = (&inner[..open], &inner[open + 1..]);
    if base.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((base, index.parse().ok()?))
}

/// Indices of `[first:last]` in written order: `[2:0]` gives 2, 1, 0 and
/// `[0:2]` gives 0, 1, 2.
pub fn range_indices(first: u32, last: u32) -> impl Iterator<Item = u32> {
    let descending = first >= last;
    let (lo, hi) = if descending { (last, first) } else { (first, last) };
    (lo..=hi).map(move |i| if descending { hi - (i - lo) } else { i })
}

/// Handle to a net inside one module; stable for the module's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetRef(usize);

impl NetRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetOrigin {
    Port(PortDirection),
    /// Named in the module header without any direction statement.
    UndirectedPort,
    Wire,
    /// Synthesized from an undeclared identifier when implicit nets are
    /// enabled.
    ImplicitWire,
    /// Bit `bit` (0 = least significant) of constant `constant`, holding
    /// `value`.
    Constant {
        constant: usize,
        bit: u32,
        value: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    name: String,
    origin: NetOrigin,
}

impl Net {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> NetOrigin {
        self.origin
    }

    pub fn is_port(&self) -> bool {
        matches!(self.origin, NetOrigin::Port(_) | NetOrigin::UndirectedPort)
    }

    pub fn constant_value(&self) -> Option<bool> {
        match self.origin {
            NetOrigin::Constant { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A literal realized as constant nets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub literal: NumericLiteral,
    /// Most significant bit first.
    pub nets: Vec<NetRef>,
}

impl Constant {
    /// The net carrying bit 0.
    pub fn lsb(&self) -> NetRef {
        self.nets[self.nets.len() - 1]
    }
}

/// An instantiated library cell with its pin-to-net bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<'lib> {
    name: String,
    entry: &'lib CellLibraryEntry,
    bindings: Vec<(String, NetRef)>,
}

impl<'lib> Cell<'lib> {
    pub fn new(name: &str, entry: &'lib CellLibraryEntry) -> Self {
        Self {
            name: name.to_string(),
            entry,
            bindings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The library entry this cell was bound against; the same object the
    /// library hands out from `lookup`.
    pub fn cell_library_entry(&self) -> &'lib CellLibraryEntry {
        self.entry
    }

    /// Bindings in source order.
    pub fn bindings(&self) -> &[(String, NetRef)] {
        &self.bindings
    }

    pub fn binding(&self, pin: &str) -> Option<NetRef> {
        self.bindings
            .iter()
            .find(|(p, _)| p == pin)
            .map(|(_, net)| *net)
    }

    /// Binds `pin` to `net`. The caller has checked the pin exists on the
    /// entry; binding the same pin twice is a duplicate.
    pub fn bind(&mut self, pin: &str, net: NetRef) -> Result<(), DuplicateError> {
        if self.binding(pin).is_some() {
            return Err(DuplicateError {
                what: "pin connection",
                name: format!("{}.{}", self.name, pin),
            });
        }
        self.bindings.push((pin.to_string(), net));
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable<'lib> {
    nets: Vec<Net>,
    net_by_name: HashMap<String, NetRef>,
    cells: Vec<Cell<'lib>>,
    cell_by_name: HashMap<String, usize>,
    constants: Vec<Constant>,
    constant_by_key: HashMap<String, usize>,
}

impl<'lib> SymbolTable<'lib> {
    pub fn new() -> Self {
        Self {
            nets: Vec::new(),
            net_by_name: HashMap::new(),
            cells: Vec::new(),
            cell_by_name: HashMap::new(),
            constants: Vec::new(),
            constant_by_key: HashMap::new(),
        }
    }

    pub fn declare_scalar(
        &mut self,
        name: &str,
        origin: NetOrigin,
    ) -> Result<NetRef, DuplicateError> {
        if self.net_by_name.contains_key(name) {
            return Err(DuplicateError {
                what: "net",
                name: name.to_string(),
            });
        }
        let net_ref = NetRef(self.nets.len());
        self.nets.push(Net {
            name: name.to_string(),
            origin,
        });
        self.net_by_name.insert(name.to_string(), net_ref);
        Ok(net_ref)
    }

    /// Declares `base[first]` through `base[last]` inclusive, in that order.
    /// `[2:0]` yields `base[2], base[1], base[0]`; an ascending range
    /// `[0:2]` yields `base[0], base[1], base[2]`.
    pub fn declare_ranged(
        &mut self,
        base: &str,
        first: u32,
        last: u32,
        origin: NetOrigin,
    ) -> Result<Vec<NetRef>, DuplicateError> {
        range_indices(first, last)
            .map(|i| self.declare_scalar(&bus_element_name(base, i), origin))
            .collect()
    }

    pub fn declare_multi<S: AsRef<str>>(
        &mut self,
        names: &[S],
        origin: NetOrigin,
    ) -> Result<Vec<NetRef>, DuplicateError> {
        names
            .iter()
            .map(|n| self.declare_scalar(n.as_ref(), origin))
            .collect()
    }

    /// Changes the origin of an existing net, e.g. to attach a direction to a
    /// header port that was first seen undirected.
    pub fn set_origin(&mut self, net: NetRef, origin: NetOrigin) {
        self.nets[net.0].origin = origin;
    }

    pub fn resolve_net(&self, name: &str) -> Result<NetRef, NotFoundError> {
        self.net_by_name
            .get(name)
            .copied()
            .ok_or_else(|| NotFoundError::new(NotFoundKind::Net, name))
    }

    pub fn contains_net(&self, name: &str) -> bool {
        self.net_by_name.contains_key(name)
    }

    pub fn net(&self, net: NetRef) -> &Net {
        &self.nets[net.0]
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn iter_nets(&self) -> impl Iterator<Item = (NetRef, &Net)> + '_ {
        self.nets.iter().enumerate().map(|(i, net)| (NetRef(i), net))
    }

    /// Realizes `literal` as one constant net per bit, most significant bit
    /// first. Repeated literals return the nets created the first time.
    pub fn make_constant(
        &mut self,
        literal: &NumericLiteral,
    ) -> Result<Vec<NetRef>, DuplicateError> {
        let key = literal.to_string();
        if let Some(&idx) = self.constant_by_key.get(&key) {
            return Ok(self.constants[idx].nets.clone());
        }
        let constant = self.constants.len();
        let width = literal.width();
        let mut nets = Vec::with_capacity(width as usize);
        for (i, value) in literal.msb_first().enumerate() {
            let bit = width - 1 - i as u32;
            let net = self.declare_scalar(
                &bus_element_name(&key, bit),
                NetOrigin::Constant {
                    constant,
                    bit,
                    value,
                },
            )?;
            nets.push(net);
        }
        self.constants.push(Constant {
            literal: literal.clone(),
            nets: nets.clone(),
        });
        self.constant_by_key.insert(key, constant);
        Ok(nets)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Finds a constant whose literal, read with its own signedness, equals
    /// `value`, and returns its least significant bit net.
    pub fn resolve_number(&self, value: i64) -> Result<NetRef, NotFoundError> {
        self.constants
            .iter()
            .find(|c| c.literal.to_i64() == Some(value))
            .map(|c| c.lsb())
            .ok_or_else(|| NotFoundError::new(NotFoundKind::Number, value.to_string()))
    }

    pub fn add_cell(&mut self, cell: Cell<'lib>) -> Result<(), DuplicateError> {
        if self.cell_by_name.contains_key(&cell.name) {
            return Err(DuplicateError {
                what: "cell",
                name: cell.name,
            });
        }
        self.cell_by_name.insert(cell.name.clone(), self.cells.len());
        self.cells.push(cell);
        Ok(())
    }

    pub fn resolve_cell(&self, name: &str) -> Result<&Cell<'lib>, NotFoundError> {
        self.cell_by_name
            .get(name)
            .map(|&i| &self.cells[i])
            .ok_or_else(|| NotFoundError::new(NotFoundKind::Cell, name))
    }

    pub fn cells(&self) -> &[Cell<'lib>] {
        &self.cells
    }
}
