// SPDX-License-Identifier: Apache-2.0

//! Error types produced while scanning, parsing, and querying netlists.

use std::fmt;

use crate::netlist::scanner::Span;

/// Lexical error: the scanner could not form a token at `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.message, self.span.to_human_string())
    }
}

impl std::error::Error for ScanError {}

/// Malformed numeric literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError(pub String);

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed literal: {}", self.0)
    }
}

impl std::error::Error for LiteralError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lexical,
    Syntax,
    UnknownCellType,
    UnknownPin,
    DuplicateDeclaration,
    UnknownNet,
    MalformedLiteral,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::Lexical => "lexical error",
            ParseErrorKind::Syntax => "syntax error",
            ParseErrorKind::UnknownCellType => "unknown cell type",
            ParseErrorKind::UnknownPin => "unknown pin",
            ParseErrorKind::DuplicateDeclaration => "duplicate declaration",
            ParseErrorKind::UnknownNet => "unknown net",
            ParseErrorKind::MalformedLiteral => "malformed literal",
        };
        write!(f, "{}", s)
    }
}

/// Fatal error that aborts parsing of a netlist source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Formats the error with the offending source line and a caret under the
    /// starting column.
    pub fn render(&self, source: &str) -> String {
        let line = source
            .lines()
            .nth((self.span.start.lineno as usize).saturating_sub(1))
            .unwrap_or("<line unavailable>");
        format!(
            "{}: {} @ {}\n{}\n{}^",
            self.kind,
            self.message,
            self.span.to_human_string(),
            line,
            " ".repeat((self.span.start.colno as usize).saturating_sub(1))
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} @ {}",
            self.kind,
            self.message,
            self.span.to_human_string()
        )
    }
}

impl std::error::Error for ParseError {}

impl From<ScanError> for ParseError {
    fn from(e: ScanError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, e.message, e.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Module,
    Net,
    Cell,
    Number,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotFoundKind::Module => "module",
            NotFoundKind::Net => "net",
            NotFoundKind::Cell => "cell",
            NotFoundKind::Number => "number",
        };
        write!(f, "{}", s)
    }
}

/// Recoverable failure of a post-parse lookup; `key` is the sought name or
/// value verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    pub what: NotFoundKind,
    pub key: String,
}

impl NotFoundError {
    pub fn new(what: NotFoundKind, key: impl Into<String>) -> Self {
        Self {
            what,
            key: key.into(),
        }
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not find {}: {}", self.what, self.key)
    }
}

impl std::error::Error for NotFoundError {}

/// A net or cell instance name collided with an existing one in the same
/// module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateError {
    pub what: &'static str,
    pub name: String,
}

impl fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate {} declaration: {}", self.what, self.name)
    }
}

impl std::error::Error for DuplicateError {}
