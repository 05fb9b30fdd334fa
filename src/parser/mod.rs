//! Parser infrastructure for GraphQL executable documents.
//!
//! The parser consumes a token stream produced by the lexer and builds a
//! [`Document`] while collecting diagnostics and recovering at definition
//! boundaries. Validation only runs on documents that parsed cleanly, so
//! [`ParseResult::document`] is `None` whenever an error was reported.

mod base;
mod document;

use miette::Report;

use crate::ast::Document;
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::tokenize;

/// Result of parsing a GraphQL document.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document, or None if any error was reported.
    pub document: Option<Document>,
    /// Lexer and parser diagnostics in source order of discovery.
    pub diagnostics: Vec<Diag>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diag::is_error)
    }

    /// Renders the collected diagnostics as miette reports.
    pub fn reports(&self, source: &SourceFile) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, source)
    }
}

/// GraphQL document parser with error recovery.
pub struct Parser<'source> {
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Creates a new parser from a token stream.
    pub fn new(mut tokens: Vec<Token>, source: &'source str) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let eof_pos = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));
        }

        Self {
            tokens,
            diagnostics: Vec::new(),
            source,
        }
    }

    /// Parses the token stream into a document.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> ParseResult {
        let (root, parser_diags) = document::parse_document_tokens(&self.tokens, self.source);
        self.diagnostics.extend(parser_diags);

        let has_error = self.diagnostics.iter().any(Diag::is_error);
        let document = if has_error {
            tracing::debug!(
                diagnostics = self.diagnostics.len(),
                "document rejected by parser"
            );
            None
        } else {
            Some(Document::new(root))
        };

        ParseResult {
            document,
            diagnostics: self.diagnostics,
        }
    }

    /// Merges lexer diagnostics with parser diagnostics.
    pub fn with_lexer_diagnostics(mut self, lex_diags: Vec<Diag>) -> Self {
        let mut all_diags = lex_diags;
        all_diags.append(&mut self.diagnostics);
        self.diagnostics = all_diags;
        self
    }
}

/// Tokenizes and parses `source` in one step.
pub fn parse(source: &str) -> ParseResult {
    let lexed = tokenize(source);
    Parser::new(lexed.tokens, source)
        .with_lexer_diagnostics(lexed.diagnostics)
        .parse()
}
