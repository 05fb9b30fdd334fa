//! Common test utilities
//!
//! Shared helpers for the integration tests.
//!
//! # Diagnostic Helpers
//! - [`format_diagnostics`] - Format syntax diagnostics for assertion messages
//! - [`format_errors`] - Format validation errors for assertion messages
//! - [`assert_no_validation_errors`] - Assert that a pass reported nothing
//! - [`assert_has_error_containing`] - Assert that some error message contains text
//!
//! # Parsing and Validation Helpers
//! - [`parse_cleanly`] - Parse source and return the document, panicking on errors
//! - [`validate_source`] - Parse and run the built-in rules
//! - [`validate_with`] - Parse and run a custom rule set

#![allow(dead_code)]

use graphql_validator::{Diag, Document, RuleSet, ValidationError, Validator, parse};

/// Install a tracing subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Format syntax diagnostics for display in assertion messages.
pub fn format_diagnostics(diags: &[Diag]) -> String {
    diags
        .iter()
        .map(|diag| format!("{diag:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format validation errors for display in assertion messages.
pub fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse source and return the document, panicking if any diagnostics occur.
pub fn parse_cleanly(source: &str) -> Document {
    let result = parse(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for `{source}`:\n{}",
        format_diagnostics(&result.diagnostics)
    );
    result
        .document
        .unwrap_or_else(|| panic!("expected a document for source: {source}"))
}

/// Parse source and run the built-in rules.
///
/// # Panics
/// Panics on syntax errors or a rule defect.
pub fn validate_source(source: &str) -> Vec<ValidationError> {
    let document = parse_cleanly(source);
    Validator::new()
        .validate_with_source(&document, source)
        .unwrap_or_else(|defect| panic!("rule defect for `{source}`: {defect}"))
}

/// Parse source and run a custom rule set.
pub fn validate_with(source: &str, rules: RuleSet) -> Vec<ValidationError> {
    let document = parse_cleanly(source);
    Validator::new()
        .with_rules(rules)
        .validate(&document)
        .unwrap_or_else(|defect| panic!("rule defect for `{source}`: {defect}"))
}

/// Errors with the given code.
pub fn errors_with_code<'a>(errors: &'a [ValidationError], code: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|error| error.code == code).collect()
}

pub fn assert_no_validation_errors(errors: &[ValidationError]) {
    assert!(
        errors.is_empty(),
        "validation should not have errors, but found {}:\n{}",
        errors.len(),
        format_errors(errors)
    );
}

pub fn assert_has_error_containing(errors: &[ValidationError], text: &str) {
    assert!(
        errors.iter().any(|error| error.message.contains(text)),
        "expected error containing '{text}', but found:\n{}",
        format_errors(errors)
    );
}
