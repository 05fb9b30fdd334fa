//! Token stream navigation shared by the document parser.

use smol_str::SmolStr;

use crate::ast::Span;
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};

/// Error type for parsing operations.
pub type ParseError = Box<Diag>;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Cursor over a token slice.
///
/// The slice must be non-empty and end with [`TokenKind::Eof`];
/// [`crate::parser::Parser::new`] guarantees both.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(!tokens.is_empty(), "token stream must end with EOF");
        Self { tokens, pos: 0 }
    }

    /// Returns the current token; past the end this is the trailing EOF.
    pub fn current(&self) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the token after the current one.
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos + 1)
    }

    /// Advances to the next token. Does nothing at EOF.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Returns true if the current token is the name `keyword`.
    pub fn check_name(&self, keyword: &str) -> bool {
        self.current().kind.is_name(keyword)
    }

    pub fn is_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Consumes the current token if it matches `kind`.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a token kind and returns its span. On mismatch the position is
    /// left unchanged.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_here(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    /// Expects a name token and returns its text and span.
    pub fn expect_name(&mut self) -> ParseResult<(SmolStr, Span)> {
        match &self.current().kind {
            TokenKind::Name(name) => {
                let result = (name.clone(), self.current().span.clone());
                self.advance();
                Ok(result)
            }
            other => Err(self.error_here(format!("expected name, found {other}"))),
        }
    }

    /// Expects the name `keyword`.
    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Span> {
        if self.check_name(keyword) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_here(format!(
                "expected '{keyword}', found {}",
                self.current().kind
            )))
        }
    }

    /// Creates an error at the current token.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_here_with_code(message, "P001")
    }

    /// Creates an error at the current token with a specific code.
    pub fn error_here_with_code(&self, message: impl Into<String>, code: &str) -> ParseError {
        Box::new(
            Diag::error(message.into())
                .with_primary_label(self.current().span.clone(), "here")
                .with_code(code),
        )
    }

    /// Returns the end offset of the most recently consumed token.
    pub fn previous_end(&self) -> usize {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.end
        } else {
            self.current().span.start
        }
    }
}
