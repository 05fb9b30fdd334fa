//! Response paths: where in a document (or a result) something happened.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One step of a path: a field or object key, or a list position.
///
/// Serializes as a bare JSON string or number, matching the `path` entry of
/// GraphQL error and tracing payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Name(SmolStr),
    Index(usize),
}

impl PathSegment {
    /// Parses a textual step, treating non-negative integers as list indices.
    pub fn parse(step: &str) -> Self {
        match step.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(step.into()),
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Name(_) => None,
            Self::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An owned sequence of segments from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of this path extended by `segment`.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders as `hero.friends[0].name`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Name(name) if position == 0 => f.write_str(name)?,
                PathSegment::Name(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

/// Mutable path for the current traversal position.
///
/// Only the dispatcher pushes and pops; rules read snapshots.
#[derive(Debug, Default)]
pub struct PathTracker {
    segments: Vec<PathSegment>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes the segment for a container node being entered.
    pub fn enter_container(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pops the segment pushed by the matching [`enter_container`](Self::enter_container).
    pub fn leave_container(&mut self) -> Option<PathSegment> {
        let popped = self.segments.pop();
        debug_assert!(popped.is_some(), "unbalanced path tracker");
        popped
    }

    /// Returns an owned snapshot of the current path.
    pub fn current_path(&self) -> Path {
        Path(self.segments.clone())
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}
