//! Shared state for one validation pass.

use smol_str::SmolStr;

use crate::ast::{Document, Node, NodeKind};
use crate::path::{Path, PathSegment, PathTracker};

use super::error::ValidationError;

/// Contextual type lookup supplied by the embedder, usually backed by a
/// schema.
///
/// The engine never interprets the returned names; it only keeps them on a
/// stack that moves in lockstep with the traversal so rules can ask for the
/// type of the current node and of its parent.
pub trait TypeInfo: Send + Sync {
    /// Returns the type of `node`, given the type of the enclosing node.
    fn enter(&self, parent_type: Option<&str>, node: &Node) -> Option<SmolStr>;
}

/// The read/write object handed to every rule callback.
///
/// A context lives for exactly one pass and is never shared between passes.
pub struct ValidationContext<'a> {
    document: &'a Document,
    source: Option<&'a str>,
    path: PathTracker,
    type_info: Option<&'a dyn TypeInfo>,
    types: Vec<Option<SmolStr>>,
    errors: Vec<ValidationError>,
    active_rule: &'static str,
}

impl<'a> ValidationContext<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            source: None,
            path: PathTracker::new(),
            type_info: None,
            types: Vec::new(),
            errors: Vec::new(),
            active_rule: "",
        }
    }

    /// Attaches the source text the document was parsed from.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// Attaches a type information provider.
    pub fn with_type_info(mut self, type_info: &'a dyn TypeInfo) -> Self {
        self.type_info = Some(type_info);
        self
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn source(&self) -> Option<&'a str> {
        self.source
    }

    /// Returns the source text covered by `node`, if the source is known.
    pub fn source_text(&self, node: &Node) -> Option<&'a str> {
        self.source.and_then(|source| source.get(node.span().clone()))
    }

    /// Snapshot of the current path.
    pub fn path(&self) -> Path {
        self.path.current_path()
    }

    pub fn path_depth(&self) -> usize {
        self.path.depth()
    }

    /// Type of the node currently being visited, if known.
    pub fn current_type(&self) -> Option<&str> {
        self.types.last().and_then(|ty| ty.as_deref())
    }

    /// Type of the enclosing node, if known.
    pub fn parent_type(&self) -> Option<&str> {
        let len = self.types.len();
        if len < 2 {
            return None;
        }
        self.types[len - 2].as_deref()
    }

    /// Records a diagnostic, stamping it with the current path and the
    /// reporting rule.
    pub fn report(&mut self, error: ValidationError) {
        let mut error = error.with_path(self.path.current_path());
        error.rule = self.active_rule;
        tracing::trace!(rule = self.active_rule, code = %error.code, "diagnostic reported");
        self.errors.push(error);
    }

    /// Diagnostics reported so far, in report order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub(crate) fn set_active_rule(&mut self, rule: &'static str) {
        self.active_rule = rule;
    }

    /// Pushes the path segment and type for a node being entered. Returns
    /// whether a path segment was pushed.
    pub(crate) fn enter_node(&mut self, node: &Node) -> bool {
        if let Some(info) = self.type_info {
            let ty = info.enter(self.current_type(), node);
            self.types.push(ty);
        }

        match container_segment(node) {
            Some(segment) => {
                self.path.enter_container(segment);
                true
            }
            None => false,
        }
    }

    /// Undoes [`enter_node`](Self::enter_node).
    pub(crate) fn leave_node(&mut self, pushed_segment: bool) {
        if pushed_segment {
            self.path.leave_container();
        }
        if self.type_info.is_some() {
            self.types.pop();
        }
    }

    pub(crate) fn enter_list_item(&mut self, index: usize) {
        self.path.enter_container(PathSegment::Index(index));
    }

    pub(crate) fn leave_list_item(&mut self) {
        self.path.leave_container();
    }
}

/// The path segment a node contributes, if it is a container.
fn container_segment(node: &Node) -> Option<PathSegment> {
    match node.kind() {
        NodeKind::Field => node.response_key().map(|key| PathSegment::Name(key.into())),
        NodeKind::ObjectField => node.name().map(|name| PathSegment::Name(name.into())),
        _ => None,
    }
}
