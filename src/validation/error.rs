//! Validation diagnostics and internal rule failures.

use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::{Location, Node, NodeId, NodeKind, Span};
use crate::diag::Diag;
use crate::path::Path;

/// A rule violation found in a document.
///
/// Serializes to the GraphQL error shape: `message`, `code`, `locations`
/// and `path`. The node ids, spans and rule name are kept for tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub message: String,
    /// Stable code defined by the reporting rule (a GraphQL spec section).
    pub code: SmolStr,
    pub locations: Vec<Location>,
    pub path: Path,
    #[serde(skip)]
    pub nodes: Vec<NodeId>,
    #[serde(skip)]
    pub spans: Vec<Span>,
    /// Name of the rule that reported the error; set by the context.
    #[serde(skip)]
    pub rule: &'static str,
}

impl ValidationError {
    pub fn new(code: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            locations: Vec::new(),
            path: Path::new(),
            nodes: Vec::new(),
            spans: Vec::new(),
            rule: "",
        }
    }

    /// Attaches an offending node: its location, span and id.
    ///
    /// Nodes are listed in the order they are attached; by convention the
    /// earlier, conflicting node comes first.
    pub fn with_node(mut self, node: &Node) -> Self {
        self.locations.push(node.location());
        self.spans.push(node.span().clone());
        self.nodes.push(node.id());
        self
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Converts the error into a `Diag` for rendering with source context.
    ///
    /// The last attached span is the primary label; earlier spans become
    /// secondary labels.
    pub fn to_diag(&self) -> Diag {
        let mut diag = Diag::error(self.message.clone()).with_code(self.code.as_str());

        if let Some((last, earlier)) = self.spans.split_last() {
            for span in earlier {
                diag = diag.with_secondary_label(span.clone(), "first defined here");
            }
            diag = diag.with_primary_label(last.clone(), "conflicts here");
        }

        if !self.path.is_empty() {
            diag = diag.with_note(format!("at path `{}`", self.path));
        }
        if !self.rule.is_empty() {
            diag = diag.with_note(format!("reported by {}", self.rule));
        }
        diag
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(location) = self.locations.first() {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

/// A rule callback hit a state it cannot handle.
///
/// Unlike a [`ValidationError`], a defect aborts the whole pass: the
/// diagnostics collected so far are discarded because they cannot be
/// trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDefect {
    #[error("{rule}: {kind} node {node} has no name")]
    MissingName {
        rule: &'static str,
        kind: NodeKind,
        node: NodeId,
    },

    #[error("{rule}: left {kind} node {node} without a matching enter")]
    UnbalancedScope {
        rule: &'static str,
        kind: NodeKind,
        node: NodeId,
    },

    #[error("{rule}: {message}")]
    Internal { rule: &'static str, message: String },
}

impl RuleDefect {
    pub fn missing_name(rule: &'static str, node: &Node) -> Self {
        Self::MissingName {
            rule,
            kind: node.kind(),
            node: node.id(),
        }
    }

    pub fn unbalanced_scope(rule: &'static str, node: &Node) -> Self {
        Self::UnbalancedScope {
            rule,
            kind: node.kind(),
            node: node.id(),
        }
    }

    pub fn internal(rule: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            rule,
            message: message.into(),
        }
    }

    /// Name of the rule that failed.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingName { rule, .. }
            | Self::UnbalancedScope { rule, .. }
            | Self::Internal { rule, .. } => rule,
        }
    }
}
