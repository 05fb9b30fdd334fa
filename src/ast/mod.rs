//! AST foundation types and node structures.

mod node;
mod span;

pub use node::{Descendants, Document, Node, NodeId, NodeKind};
pub use span::{LineIndex, Location, Span};
