// SPDX-License-Identifier: Apache-2.0

//! Token scanner for gate-level netlist source text.
//!
//! Whitespace, `// line` comments and `/* block */` comments separate tokens
//! and are never emitted. Once the input is exhausted the scanner yields
//! `TokenKind::EndOfInput` on every subsequent call.

use std::fmt;

use crate::netlist_error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Module,
    Endmodule,
    Wire,
    Input,
    Output,
    Inout,
}

impl Keyword {
    fn from_ident(s: &str) -> Option<Self> {
        match s {
            "module" => Some(Keyword::Module),
            "endmodule" => Some(Keyword::Endmodule),
            "wire" => Some(Keyword::Wire),
            "input" => Some(Keyword::Input),
            "output" => Some(Keyword::Output),
            "inout" => Some(Keyword::Inout),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Module => "module",
            Keyword::Endmodule => "endmodule",
            Keyword::Wire => "wire",
            Keyword::Input => "input",
            Keyword::Output => "output",
            Keyword::Inout => "inout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword(Keyword),
    OParen,
    CParen,
    OBrack,
    CBrack,
    Colon,
    Semi,
    Comma,
    Dot,
    /// Plain decimal or sized (`8'sd255`) literal; the lexeme holds its text.
    Number,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            TokenKind::OParen => write!(f, "'('"),
            TokenKind::CParen => write!(f, "')'"),
            TokenKind::OBrack => write!(f, "'['"),
            TokenKind::CBrack => write!(f, "']'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::EndOfInput => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    /// Byte offset into the source text.
    pub offset: usize,
    pub lineno: u32,
    pub colno: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Pos,
    pub limit: Pos,
}

impl Span {
    pub fn to_human_string(&self) -> String {
        format!(
            "{}:{}..{}:{}",
            self.start.lineno, self.start.colno, self.limit.lineno, self.limit.colno
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn source_offset(&self) -> usize {
        self.span.start.offset
    }

    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier `{}`", self.lexeme),
            TokenKind::Number => format!("number `{}`", self.lexeme),
            other => other.to_string(),
        }
    }
}

/// Whether `name` is a Verilog simple identifier: a letter or `_` followed by
/// letters, digits, `_` or `$`.
pub fn is_simple_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}

pub struct Scanner<'a> {
    text: &'a str,
    pos: Pos,
    lookahead: Option<Token>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: Pos {
                offset: 0,
                lineno: 1,
                colno: 1,
            },
            lookahead: None,
        }
    }

    /// Current position of the scanner (after any buffered look-ahead token).
    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Returns the 1-based source line `lineno`, if present.
    pub fn line(&self, lineno: u32) -> Option<&'a str> {
        self.text
            .lines()
            .nth((lineno as usize).checked_sub(1)?)
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token, ScanError> {
        let tok = match self.lookahead.take() {
            Some(tok) => tok,
            None => self.scan_token()?,
        };
        Ok(self.lookahead.insert(tok))
    }

    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        match self.lookahead.take() {
            Some(tok) => Ok(tok),
            None => self.scan_token(),
        }
    }

    #[inline]
    fn peekb_at(&self, n: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos.offset + n).copied()
    }

    #[inline]
    fn peekb(&self) -> Option<u8> {
        self.peekb_at(0)
    }

    #[inline]
    fn popb(&mut self) -> Option<u8> {
        let b = self.peekb()?;
        self.pos.offset += 1;
        if b == b'\n' {
            self.pos.lineno += 1;
            self.pos.colno = 1;
        } else {
            self.pos.colno += 1;
        }
        Some(b)
    }

    fn error_with_context(&self, msg: &str, span: Span) -> ScanError {
        let line = self
            .line(span.start.lineno)
            .unwrap_or("<line unavailable>");
        let col = (span.start.colno as usize).saturating_sub(1);
        log::error!("ScanError: {} @ {}", msg, span.to_human_string());
        log::error!("{}", line);
        log::error!("{}^", " ".repeat(col));
        ScanError {
            message: msg.to_string(),
            span,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ScanError> {
        loop {
            match self.peekb() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.popb();
                }
                Some(b'/') => match self.peekb_at(1) {
                    Some(b'/') => {
                        while let Some(b) = self.popb() {
                            if b == b'\n' {
                                break;
                            }
                        }
                    }
                    Some(b'*') => {
                        let start = self.pos;
                        self.popb();
                        self.popb();
                        let mut prev = None;
                        loop {
                            match self.popb() {
                                Some(b'/') if prev == Some(b'*') => break,
                                Some(b) => prev = Some(b),
                                None => {
                                    return Err(self.error_with_context(
                                        "Unterminated block comment",
                                        Span {
                                            start,
                                            limit: self.pos,
                                        },
                                    ));
                                }
                            }
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: Pos) -> Token {
        Token {
            kind,
            lexeme: self.text[start.offset..self.pos.offset].to_string(),
            span: Span {
                start,
                limit: self.pos,
            },
        }
    }

    fn pop_identifier(&mut self, start: Pos) -> Result<Token, ScanError> {
        if self.peekb() == Some(b'\\') {
            // Escaped identifier: everything up to the next whitespace.
            self.popb();
            let name_start = self.pos.offset;
            while let Some(b) = self.peekb() {
                if b.is_ascii_whitespace() {
                    break;
                }
                self.popb();
            }
            if self.pos.offset == name_start {
                return Err(self.error_with_context(
                    "Empty escaped identifier",
                    Span {
                        start,
                        limit: self.pos,
                    },
                ));
            }
            // A name that could also be written unescaped drops the backslash;
            // any other keeps it, so `\i[0] ` never aliases bus element `i[0]`.
            let name = &self.text[name_start..self.pos.offset];
            let lexeme = if is_simple_identifier(name) {
                name.to_string()
            } else {
                format!("\\{}", name)
            };
            return Ok(Token {
                kind: TokenKind::Identifier,
                lexeme,
                span: Span {
                    start,
                    limit: self.pos,
                },
            });
        }
        while let Some(b) = self.peekb() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.popb();
            } else {
                break;
            }
        }
        let ident = &self.text[start.offset..self.pos.offset];
        let kind = match Keyword::from_ident(ident) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier,
        };
        Ok(self.make_token(kind, start))
    }

    /// Scans `<digits>` or `<digits>'[s]<base><digits>`. Digit validity for
    /// the base is checked by the literal interpreter, not here.
    fn pop_number(&mut self, start: Pos) -> Result<Token, ScanError> {
        while let Some(b) = self.peekb() {
            if b.is_ascii_digit() || b == b'_' {
                self.popb();
            } else {
                break;
            }
        }
        if self.peekb() != Some(b'\'') {
            return Ok(self.make_token(TokenKind::Number, start));
        }
        self.popb();
        if matches!(self.peekb(), Some(b's' | b'S')) {
            self.popb();
        }
        match self.peekb() {
            Some(b'b' | b'B' | b'o' | b'O' | b'd' | b'D' | b'h' | b'H') => {
                self.popb();
            }
            _ => {
                return Err(self.error_with_context(
                    "Expected base specifier (b, o, d, h) in numeric literal",
                    Span {
                        start,
                        limit: self.pos,
                    },
                ));
            }
        }
        let digits_start = self.pos.offset;
        while let Some(b) = self.peekb() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'?' {
                self.popb();
            } else {
                break;
            }
        }
        if self.pos.offset == digits_start {
            return Err(self.error_with_context(
                "Unterminated numeric literal: no digits after base specifier",
                Span {
                    start,
                    limit: self.pos,
                },
            ));
        }
        Ok(self.make_token(TokenKind::Number, start))
    }

    fn scan_token(&mut self) -> Result<Token, ScanError> {
        self.skip_whitespace_and_comments()?;
        let start = self.pos;
        let b = match self.peekb() {
            Some(b) => b,
            None => return Ok(self.make_token(TokenKind::EndOfInput, start)),
        };
        if b.is_ascii_alphabetic() || b == b'_' || b == b'\\' {
            return self.pop_identifier(start);
        }
        if b.is_ascii_digit() {
            return self.pop_number(start);
        }
        let kind = match b {
            b'(' => TokenKind::OParen,
            b')' => TokenKind::CParen,
            b'[' => TokenKind::OBrack,
            b']' => TokenKind::CBrack,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semi,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            _ => {
                let c = self.text[start.offset..].chars().next().unwrap_or('?');
                return Err(self.error_with_context(
                    &format!("Unexpected character '{}'", c),
                    Span {
                        start,
                        limit: start,
                    },
                ));
            }
        };
        self.popb();
        Ok(self.make_token(kind, start))
    }
}
