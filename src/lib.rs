//! Single-pass, rule-based validation of GraphQL executable documents.
//!
//! Documents are lexed and parsed with error recovery into a uniform syntax
//! tree. A validation pass then walks the tree exactly once, dispatching
//! each node only to the rules that asked for its kind, and collects every
//! rule violation together with its source locations and response path.
//! Diagnostics render through miette with source context.
//!
//! # Example
//!
//! ```
//! use graphql_validator::{parse_and_validate, validation::rules::codes};
//!
//! let errors = parse_and_validate("query($a: Int, $a: String) { f }").unwrap();
//!
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].code, codes::UNIQUE_VARIABLE_NAMES);
//! assert_eq!(errors[0].message, "There can be only one variable named \"a\"");
//! ```

pub mod ast;
pub mod diag;
pub mod instrumentation;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod scalars;
pub mod validation;

use miette::Report;
use thiserror::Error;

// Re-export syntax primitives.
pub use ast::{Document, Location, Node, NodeId, NodeKind, Span};

// Re-export diagnostics and the front end for convenience.
pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, SourceFile};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use parser::{ParseResult, Parser, parse};
pub use path::{Path, PathSegment, PathTracker};
pub use validation::{
    Rule, RuleDefect, RuleSet, TypeInfo, ValidationConfig, ValidationContext, ValidationError,
    Validator, core_rules,
};

/// Errors returned by the one-shot entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// The source did not parse; the diagnostics say why.
    #[error("document has {} syntax error(s)", .0.iter().filter(|d| d.is_error()).count())]
    Syntax(Vec<Diag>),

    #[error(transparent)]
    Rule(#[from] RuleDefect),

    #[error("invalid validation config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Runs `rules` over an already parsed document.
pub fn validate(document: &Document, rules: &RuleSet) -> Result<Vec<ValidationError>, RuleDefect> {
    validation::run(document, rules)
}

/// Parses `source` and validates it with the built-in rules.
///
/// Returns `Ok` with the (possibly empty) diagnostics when the document
/// parsed, [`Error::Syntax`] when it did not.
pub fn parse_and_validate(source: &str) -> Result<Vec<ValidationError>, Error> {
    let parsed = parse(source);
    let Some(document) = parsed.document else {
        return Err(Error::Syntax(parsed.diagnostics));
    };
    Ok(Validator::new().validate_with_source(&document, source)?)
}

/// Renders validation errors as miette reports against `source`.
pub fn render_errors(errors: &[ValidationError], source: &SourceFile) -> Vec<Report> {
    let diags: Vec<Diag> = errors.iter().map(ValidationError::to_diag).collect();
    diag::convert_diagnostics_to_reports(&diags, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _segment = PathSegment::Index(0);
        assert_eq!(core_rules().len(), 6);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = parse_and_validate("query {").expect_err("syntax error");
        match err {
            Error::Syntax(diags) => assert!(!diags.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn render_includes_code() {
        let source = "query($a: Int, $a: Int) { f }";
        let errors = parse_and_validate(source).expect("parsed");
        let reports = render_errors(&errors, &SourceFile::new(source));
        assert_eq!(reports.len(), 1);
        let code = reports[0].code().map(|code| code.to_string());
        assert_eq!(code.as_deref(), Some("5.7.1"));
        assert_eq!(reports[0].labels().map(Iterator::count), Some(2));
    }
}
