// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser for flat structural netlists.
//!
//! Grammar accepted (one token of look-ahead, no backtracking):
//!
//! ```text
//! netlist         := { module }
//! module          := 'module' IDENT '(' [ IDENT { ',' IDENT } ] ')' ';'
//!                    { statement } 'endmodule'
//! statement       := wire_decl | io_decl | cell_instance
//! wire_decl       := 'wire' [ range ] name_list ';'
//! io_decl         := ('input' | 'output' | 'inout') [ range ] name_list ';'
//! range           := '[' INT ':' INT ']'
//! name_list       := IDENT { ',' IDENT }
//! cell_instance   := CELL_TYPE IDENT '(' [ connection { ',' connection } ] ')' ';'
//! connection      := '.' PIN '(' [ expr ] ')'
//! expr            := IDENT [ '[' INT ']' ] | NUMBER
//! ```
//!
//! Cell types and pins are checked against the `CellLibrary` as they are
//! parsed; nets named in connections must already be declared (or be header
//! ports) unless implicit nets are enabled.

use std::collections::HashSet;

use crate::cell_library::CellLibrary;
use crate::netlist::module::{Module, Netlist};
use crate::netlist::number::{MAX_LITERAL_WIDTH, NumericLiteral, parse_numeric_literal};
use crate::netlist::scanner::{Keyword, Scanner, Span, Token, TokenKind};
use crate::netlist::symbols::{
    Cell, NetOrigin, NetRef, PortDirection, bus_element_name, range_indices,
};
use crate::netlist_error::{DuplicateError, NotFoundError, ParseError, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Synthesize a 1-bit wire for an undeclared identifier used in a
    /// connection (Verilog implicit-net semantics) instead of failing.
    pub allow_implicit_nets: bool,
}

/// Right-hand side of a `.PIN(expr)` connection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectionExpr {
    NamedNet(String),
    IndexedNet(String, u32),
    Literal(NumericLiteral),
    Unconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleState {
    Start,
    InHeader,
    InBody,
    Closed,
}

/// A module under construction plus the bookkeeping needed to attach port
/// directions to header names.
struct ModuleBuilder<'lib> {
    module: Module<'lib>,
    /// Header ports that already have nets.
    declared_ports: HashSet<String>,
    state: ModuleState,
}

impl<'lib> ModuleBuilder<'lib> {
    fn transition(&mut self, next: ModuleState) {
        log::trace!(
            "module '{}': {:?} -> {:?}",
            self.module.name(),
            self.state,
            next
        );
        self.state = next;
    }
}

fn duplicate(e: DuplicateError, span: Span) -> ParseError {
    ParseError::new(ParseErrorKind::DuplicateDeclaration, e.to_string(), span)
}

pub struct Parser<'s, 'src, 'lib> {
    scanner: &'s mut Scanner<'src>,
    library: &'lib CellLibrary,
    options: ParseOptions,
}

impl<'s, 'src, 'lib> Parser<'s, 'src, 'lib> {
    /// Parses every module in the scanner's source text.
    pub fn parse_netlist(
        library: &'lib CellLibrary,
        scanner: &'s mut Scanner<'src>,
    ) -> Result<Netlist<'lib>, ParseError> {
        Self::parse_netlist_with_options(library, scanner, ParseOptions::default())
    }

    pub fn parse_netlist_with_options(
        library: &'lib CellLibrary,
        scanner: &'s mut Scanner<'src>,
        options: ParseOptions,
    ) -> Result<Netlist<'lib>, ParseError> {
        let mut parser = Parser {
            scanner,
            library,
            options,
        };
        parser.parse_file()
    }

    fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        Ok(self.scanner.peek_token()?.kind)
    }

    fn pop(&mut self) -> Result<Token, ParseError> {
        Ok(self.scanner.next_token()?)
    }

    fn try_pop(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.peek_kind()? == kind {
            self.pop()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ParseError> {
        let tok = self.pop()?;
        if tok.kind != kind {
            return Err(ParseError::new(
                ParseErrorKind::Syntax,
                format!("expected {} {}, found {}", kind, context, tok.describe()),
                tok.span,
            ));
        }
        Ok(tok)
    }

    fn expect_identifier(&mut self, context: &str) -> Result<Token, ParseError> {
        self.expect(TokenKind::Identifier, context)
    }

    fn literal(&self, tok: &Token) -> Result<NumericLiteral, ParseError> {
        parse_numeric_literal(&tok.lexeme).map_err(|e| {
            ParseError::new(ParseErrorKind::MalformedLiteral, e.to_string(), tok.span)
        })
    }

    /// Parses a number token used as a bit index or range bound.
    fn parse_index(&mut self, context: &str) -> Result<u32, ParseError> {
        let tok = self.expect(TokenKind::Number, context)?;
        let literal = self.literal(&tok)?;
        literal
            .to_i64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::MalformedLiteral,
                    format!("index `{}` is out of range", tok.lexeme),
                    tok.span,
                )
            })
    }

    /// Parses `[first:last]`; the range may span at most `MAX_LITERAL_WIDTH`
    /// bits.
    fn parse_range(&mut self) -> Result<(u32, u32), ParseError> {
        let open = self.expect(TokenKind::OBrack, "to open range")?;
        let first = self.parse_index("for range bound")?;
        self.expect(TokenKind::Colon, "in range")?;
        let last = self.parse_index("for range bound")?;
        let close = self.expect(TokenKind::CBrack, "to close range")?;
        let width = u64::from(first.abs_diff(last)) + 1;
        if width > u64::from(MAX_LITERAL_WIDTH) {
            return Err(ParseError::new(
                ParseErrorKind::Syntax,
                format!(
                    "range [{}:{}] is {} bits wide; at most {} are supported",
                    first, last, width, MAX_LITERAL_WIDTH
                ),
                Span {
                    start: open.span.start,
                    limit: close.span.limit,
                },
            ));
        }
        Ok((first, last))
    }

    fn parse_optional_range(&mut self) -> Result<Option<(u32, u32)>, ParseError> {
        if self.peek_kind()? == TokenKind::OBrack {
            return Ok(Some(self.parse_range()?));
        }
        Ok(None)
    }

    fn parse_name_list(&mut self, context: &str) -> Result<Vec<Token>, ParseError> {
        let mut names = vec![self.expect_identifier(context)?];
        while self.try_pop(TokenKind::Comma)? {
            names.push(self.expect_identifier(context)?);
        }
        Ok(names)
    }

    fn parse_file(&mut self) -> Result<Netlist<'lib>, ParseError> {
        log::trace!("parse_file: start");
        let mut netlist = Netlist::new();
        loop {
            match self.peek_kind()? {
                TokenKind::EndOfInput => break,
                TokenKind::Keyword(Keyword::Module) => {
                    let (module, name_span) = self.parse_module()?;
                    netlist
                        .add_module(module)
                        .map_err(|e| duplicate(e, name_span))?;
                }
                _ => {
                    let tok = self.pop()?;
                    return Err(ParseError::new(
                        ParseErrorKind::Syntax,
                        format!("expected 'module' or end of input, found {}", tok.describe()),
                        tok.span,
                    ));
                }
            }
        }
        log::trace!("parse_file: done; modules parsed: {}", netlist.len());
        Ok(netlist)
    }

    fn parse_module(&mut self) -> Result<(Module<'lib>, Span), ParseError> {
        self.expect(TokenKind::Keyword(Keyword::Module), "to start a module")?;
        let name_tok = self.expect_identifier("for module name")?;
        let mut b = ModuleBuilder {
            module: Module::new(&name_tok.lexeme),
            declared_ports: HashSet::new(),
            state: ModuleState::Start,
        };
        b.transition(ModuleState::InHeader);

        self.expect(TokenKind::OParen, "after module name")?;
        if !self.try_pop(TokenKind::CParen)? {
            loop {
                let port = self.expect_identifier("in module port list")?;
                if !b.module.add_port(&port.lexeme) {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateDeclaration,
                        format!("port '{}' listed more than once", port.lexeme),
                        port.span,
                    ));
                }
                if self.try_pop(TokenKind::Comma)? {
                    continue;
                }
                self.expect(TokenKind::CParen, "to close module port list")?;
                break;
            }
        }
        self.expect(TokenKind::Semi, "after module header")?;
        b.transition(ModuleState::InBody);

        loop {
            match self.peek_kind()? {
                TokenKind::Keyword(Keyword::Endmodule) => {
                    self.pop()?;
                    break;
                }
                TokenKind::Keyword(Keyword::Wire) => self.parse_wire_decl(&mut b)?,
                TokenKind::Keyword(Keyword::Input) => {
                    self.parse_io_decl(&mut b, PortDirection::Input)?
                }
                TokenKind::Keyword(Keyword::Output) => {
                    self.parse_io_decl(&mut b, PortDirection::Output)?
                }
                TokenKind::Keyword(Keyword::Inout) => {
                    self.parse_io_decl(&mut b, PortDirection::Inout)?
                }
                TokenKind::Identifier => self.parse_cell_instance(&mut b)?,
                _ => {
                    let tok = self.pop()?;
                    return Err(ParseError::new(
                        ParseErrorKind::Syntax,
                        format!(
                            "expected declaration, cell instance, or 'endmodule', found {}",
                            tok.describe()
                        ),
                        tok.span,
                    ));
                }
            }
        }

        // Header names never given a direction or wire declaration still
        // exist as nets.
        let pending: Vec<String> = b
            .module
            .ports()
            .iter()
            .filter(|p| !b.declared_ports.contains(&p.name))
            .map(|p| p.name.clone())
            .collect();
        for name in pending {
            log::debug!(
                "module '{}': port '{}' has no direction declaration",
                b.module.name(),
                name
            );
            b.module
                .symbols_mut()
                .declare_scalar(&name, NetOrigin::UndirectedPort)
                .map_err(|e| duplicate(e, name_tok.span))?;
        }
        b.transition(ModuleState::Closed);
        Ok((b.module, name_tok.span))
    }

    /// Declares `name` (scalar or over `range`) with `origin`.
    fn declare(
        b: &mut ModuleBuilder<'lib>,
        name: &str,
        range: Option<(u32, u32)>,
        origin: NetOrigin,
    ) -> Result<Vec<NetRef>, DuplicateError> {
        let symbols = b.module.symbols_mut();
        match range {
            Some((first, last)) => symbols.declare_ranged(name, first, last, origin),
            None => symbols.declare_scalar(name, origin).map(|r| vec![r]),
        }
    }

    fn parse_wire_decl(&mut self, b: &mut ModuleBuilder<'lib>) -> Result<(), ParseError> {
        self.pop()?;
        let range = self.parse_optional_range()?;
        let names = self.parse_name_list("in wire declaration")?;
        self.expect(TokenKind::Semi, "after wire declaration")?;
        for tok in names {
            let name = tok.lexeme.as_str();
            if b.module.port(name).is_none() {
                Self::declare(b, name, range, NetOrigin::Wire)
                    .map_err(|e| duplicate(e, tok.span))?;
                continue;
            }
            if b.declared_ports.contains(name) {
                log::debug!("module '{}': wire redeclares port '{}'", b.module.name(), name);
                continue;
            }
            Self::declare(b, name, range, NetOrigin::UndirectedPort)
                .map_err(|e| duplicate(e, tok.span))?;
            b.declared_ports.insert(name.to_string());
            if let Some(port) = b.module.port_mut(name) {
                port.range = range;
            }
        }
        Ok(())
    }

    fn parse_io_decl(
        &mut self,
        b: &mut ModuleBuilder<'lib>,
        direction: PortDirection,
    ) -> Result<(), ParseError> {
        self.pop()?;
        let range = self.parse_optional_range()?;
        let names = self.parse_name_list("in port declaration")?;
        self.expect(TokenKind::Semi, "after port declaration")?;
        let origin = NetOrigin::Port(direction);
        for tok in names {
            let name = tok.lexeme.as_str();
            if b.module.add_port(name) {
                log::warn!(
                    "module '{}': '{}' declared {:?} but not listed in the module header",
                    b.module.name(),
                    name,
                    direction
                );
            }
            if b.declared_ports.contains(name) {
                // Seen before without a direction: attach it.
                // The earlier declaration must have produced exactly the nets
                // this one would, in the same order.
                let existing = match range {
                    Some((first, last)) => {
                        let bus = b.module.bus(name);
                        let same_shape = bus.len() == range_indices(first, last).count()
                            && bus.iter().zip(range_indices(first, last)).all(|(r, i)| {
                                b.module.net(*r).name() == bus_element_name(name, i)
                            });
                        if same_shape { bus } else { Vec::new() }
                    }
                    None => b.module.resolve_net(name).into_iter().collect(),
                };
                let undirected = !existing.is_empty()
                    && existing
                        .iter()
                        .all(|r| b.module.net(*r).origin() == NetOrigin::UndirectedPort);
                if !undirected {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateDeclaration,
                        format!("conflicting declaration of port '{}'", name),
                        tok.span,
                    ));
                }
                for r in existing {
                    b.module.symbols_mut().set_origin(r, origin);
                }
            } else {
                Self::declare(b, name, range, origin).map_err(|e| duplicate(e, tok.span))?;
                b.declared_ports.insert(name.to_string());
            }
            if let Some(port) = b.module.port_mut(name) {
                port.direction = Some(direction);
                if range.is_some() {
                    port.range = range;
                }
            }
        }
        Ok(())
    }

    fn parse_connection_expr(&mut self) -> Result<(ConnectionExpr, Span), ParseError> {
        let tok = match self.peek_kind()? {
            TokenKind::CParen => {
                let span = self.scanner.peek_token()?.span;
                return Ok((ConnectionExpr::Unconnected, span));
            }
            TokenKind::Identifier | TokenKind::Number => self.pop()?,
            _ => {
                let tok = self.pop()?;
                return Err(ParseError::new(
                    ParseErrorKind::Syntax,
                    format!(
                        "expected net name, bit-select, or number in connection, found {}",
                        tok.describe()
                    ),
                    tok.span,
                ));
            }
        };
        if tok.kind == TokenKind::Number {
            return Ok((ConnectionExpr::Literal(self.literal(&tok)?), tok.span));
        }
        if self.try_pop(TokenKind::OBrack)? {
            let index = self.parse_index("for bit-select index")?;
            let close = self.expect(TokenKind::CBrack, "to close bit-select")?;
            let span = Span {
                start: tok.span.start,
                limit: close.span.limit,
            };
            return Ok((ConnectionExpr::IndexedNet(tok.lexeme, index), span));
        }
        Ok((ConnectionExpr::NamedNet(tok.lexeme), tok.span))
    }

    /// Produces the nets an expression connects to, most significant first.
    fn resolve_connection(
        &self,
        b: &mut ModuleBuilder<'lib>,
        expr: &ConnectionExpr,
        span: Span,
    ) -> Result<Vec<NetRef>, ParseError> {
        let unknown_net =
            |e: NotFoundError| ParseError::new(ParseErrorKind::UnknownNet, e.to_string(), span);
        match expr {
            ConnectionExpr::Unconnected => Ok(Vec::new()),
            ConnectionExpr::IndexedNet(base, index) => b
                .module
                .resolve_net(&bus_element_name(base, *index))
                .map(|r| vec![r])
                .map_err(unknown_net),
            ConnectionExpr::Literal(literal) => b
                .module
                .symbols_mut()
                .make_constant(literal)
                .map_err(|e| duplicate(e, span)),
            ConnectionExpr::NamedNet(name) => {
                if let Ok(r) = b.module.resolve_net(name) {
                    return Ok(vec![r]);
                }
                if b.module.port(name).is_some() && !b.declared_ports.contains(name) {
                    log::debug!(
                        "module '{}': port '{}' used before its direction declaration",
                        b.module.name(),
                        name
                    );
                    let r = b
                        .module
                        .symbols_mut()
                        .declare_scalar(name, NetOrigin::UndirectedPort)
                        .map_err(|e| duplicate(e, span))?;
                    b.declared_ports.insert(name.clone());
                    return Ok(vec![r]);
                }
                if self.options.allow_implicit_nets {
                    log::debug!("module '{}': implicit net '{}'", b.module.name(), name);
                    return b
                        .module
                        .symbols_mut()
                        .declare_scalar(name, NetOrigin::ImplicitWire)
                        .map(|r| vec![r])
                        .map_err(|e| duplicate(e, span));
                }
                b.module.resolve_net(name).map(|r| vec![r]).map_err(unknown_net)
            }
        }
    }

    fn parse_cell_instance(&mut self, b: &mut ModuleBuilder<'lib>) -> Result<(), ParseError> {
        let type_tok = self.expect_identifier("for cell type")?;
        let library = self.library;
        let entry = library.lookup(&type_tok.lexeme).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnknownCellType,
                format!("cell type '{}' is not in the cell library", type_tok.lexeme),
                type_tok.span,
            )
        })?;
        let inst_tok = self.expect_identifier("for cell instance name")?;
        log::trace!(
            "module '{}': instance {} {}",
            b.module.name(),
            type_tok.lexeme,
            inst_tok.lexeme
        );
        let mut cell = Cell::new(&inst_tok.lexeme, entry);

        self.expect(TokenKind::OParen, "after cell instance name")?;
        if !self.try_pop(TokenKind::CParen)? {
            loop {
                self.expect(TokenKind::Dot, "before pin name")?;
                let pin_tok = self.expect_identifier("for pin name")?;
                if !entry.has_pin(&pin_tok.lexeme) {
                    return Err(ParseError::new(
                        ParseErrorKind::UnknownPin,
                        format!(
                            "cell type '{}' has no pin '{}'",
                            entry.type_name(),
                            pin_tok.lexeme
                        ),
                        pin_tok.span,
                    ));
                }
                self.expect(TokenKind::OParen, "before connection expression")?;
                let (expr, span) = self.parse_connection_expr()?;
                self.expect(TokenKind::CParen, "after connection expression")?;

                let nets = self.resolve_connection(b, &expr, span)?;
                match nets.last() {
                    Some(&lsb) => {
                        if nets.len() > 1 {
                            log::debug!(
                                "{}.{}: {}-bit connection truncated to its least significant bit",
                                inst_tok.lexeme,
                                pin_tok.lexeme,
                                nets.len()
                            );
                        }
                        cell.bind(&pin_tok.lexeme, lsb)
                            .map_err(|e| duplicate(e, pin_tok.span))?;
                    }
                    None => log::trace!("{}.{} left unconnected", inst_tok.lexeme, pin_tok.lexeme),
                }

                if self.try_pop(TokenKind::Comma)? {
                    continue;
                }
                self.expect(TokenKind::CParen, "to close connection list")?;
                break;
            }
        }
        self.expect(TokenKind::Semi, "after cell instance")?;
        b.module
            .symbols_mut()
            .add_cell(cell)
            .map_err(|e| duplicate(e, inst_tok.span))
    }
}

/// Parses `text` against `library` with default options.
pub fn parse_netlist_str<'lib>(
    library: &'lib CellLibrary,
    text: &str,
) -> Result<Netlist<'lib>, ParseError> {
    let mut scanner = Scanner::new(text);
    Parser::parse_netlist(library, &mut scanner)
}
