//! Syntax tree nodes for GraphQL executable documents.
//!
//! The tree is deliberately uniform: every node carries a [`NodeKind`] tag,
//! an optional name, a source position and an ordered list of children. Rules
//! dispatch on the tag instead of matching on a family of node structs, which
//! keeps the validation engine independent of the document grammar.

use smol_str::SmolStr;

use super::span::{Location, Span};

/// Stable identity of a node within one document.
///
/// Ids are assigned in pre-order when a [`Document`] is built, so comparing
/// ids compares document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from its raw index.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw pre-order index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural kind of a syntax tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Document,
    OperationDefinition,
    FragmentDefinition,
    VariableDefinition,
    Variable,
    SelectionSet,
    Field,
    Argument,
    FragmentSpread,
    InlineFragment,
    Directive,
    NamedType,
    ListType,
    NonNullType,
    IntValue,
    FloatValue,
    StringValue,
    BooleanValue,
    NullValue,
    EnumValue,
    ListValue,
    ObjectValue,
    ObjectField,
}

impl NodeKind {
    /// Number of node kinds; the size of per-kind lookup tables.
    pub const COUNT: usize = 23;

    /// Every node kind, in declaration order.
    pub const ALL: [NodeKind; Self::COUNT] = [
        NodeKind::Document,
        NodeKind::OperationDefinition,
        NodeKind::FragmentDefinition,
        NodeKind::VariableDefinition,
        NodeKind::Variable,
        NodeKind::SelectionSet,
        NodeKind::Field,
        NodeKind::Argument,
        NodeKind::FragmentSpread,
        NodeKind::InlineFragment,
        NodeKind::Directive,
        NodeKind::NamedType,
        NodeKind::ListType,
        NodeKind::NonNullType,
        NodeKind::IntValue,
        NodeKind::FloatValue,
        NodeKind::StringValue,
        NodeKind::BooleanValue,
        NodeKind::NullValue,
        NodeKind::EnumValue,
        NodeKind::ListValue,
        NodeKind::ObjectValue,
        NodeKind::ObjectField,
    ];

    /// Position of this kind in per-kind lookup tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns a human-readable name for this node kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::OperationDefinition => "OperationDefinition",
            Self::FragmentDefinition => "FragmentDefinition",
            Self::VariableDefinition => "VariableDefinition",
            Self::Variable => "Variable",
            Self::SelectionSet => "SelectionSet",
            Self::Field => "Field",
            Self::Argument => "Argument",
            Self::FragmentSpread => "FragmentSpread",
            Self::InlineFragment => "InlineFragment",
            Self::Directive => "Directive",
            Self::NamedType => "NamedType",
            Self::ListType => "ListType",
            Self::NonNullType => "NonNullType",
            Self::IntValue => "IntValue",
            Self::FloatValue => "FloatValue",
            Self::StringValue => "StringValue",
            Self::BooleanValue => "BooleanValue",
            Self::NullValue => "NullValue",
            Self::EnumValue => "EnumValue",
            Self::ListValue => "ListValue",
            Self::ObjectValue => "ObjectValue",
            Self::ObjectField => "ObjectField",
        }
    }

    /// Returns true for input value kinds (literals, lists, objects, variables).
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Self::Variable
                | Self::IntValue
                | Self::FloatValue
                | Self::StringValue
                | Self::BooleanValue
                | Self::NullValue
                | Self::EnumValue
                | Self::ListValue
                | Self::ObjectValue
        )
    }

    /// Returns true for type reference kinds.
    pub fn is_type(self) -> bool {
        matches!(self, Self::NamedType | Self::ListType | Self::NonNullType)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A syntax tree node.
///
/// Which optional fields are populated depends on the kind:
///
/// | kind | `name` | `alias` | `value` |
/// |------|--------|---------|---------|
/// | `OperationDefinition` | operation name | | `query` / `mutation` / `subscription` |
/// | `FragmentDefinition`, `FragmentSpread` | fragment name | | |
/// | `VariableDefinition`, `Variable` | variable name (no `$`) | | |
/// | `Field` | field name | alias | |
/// | `Argument`, `Directive`, `ObjectField`, `NamedType` | name | | |
/// | literal values | | | literal text (strings unescaped) |
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    name: Option<SmolStr>,
    alias: Option<SmolStr>,
    value: Option<SmolStr>,
    span: Span,
    location: Location,
    children: Vec<Node>,
}

impl Node {
    /// Creates a leaf node without name or children.
    pub fn new(id: NodeId, kind: NodeKind, span: Span, location: Location) -> Self {
        Self {
            id,
            kind,
            name: None,
            alias: None,
            value: None,
            span,
            location,
            children: Vec::new(),
        }
    }

    /// Sets the node name.
    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the field alias.
    pub fn with_alias(mut self, alias: impl Into<SmolStr>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the literal text.
    pub fn with_value(mut self, value: impl Into<SmolStr>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child nodes.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Assigns pre-order ids to this subtree, starting at `next`.
    pub(crate) fn assign_ids(&mut self, next: &mut u32) {
        self.id = NodeId::new(*next);
        *next += 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the key under which a field appears in a response: the alias
    /// when present, otherwise the field name.
    pub fn response_key(&self) -> Option<&str> {
        self.alias().or_else(|| self.name())
    }

    /// Returns the first direct child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Iterates the direct children of the given kind.
    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Iterates this node and all descendants in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree, returned by [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed executable document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
    node_count: usize,
}

impl Document {
    /// Wraps a `Document` root node, numbering the whole tree in pre-order.
    ///
    /// Ids supplied by the caller are replaced, so every node of a document
    /// has a unique id and each subtree covers a contiguous id range.
    pub fn new(mut root: Node) -> Self {
        let mut next = 0;
        root.assign_ids(&mut next);
        Self {
            root,
            node_count: next as usize,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Iterates the operation definitions in document order.
    pub fn operations(&self) -> impl Iterator<Item = &Node> {
        self.root.children_of(NodeKind::OperationDefinition)
    }

    /// Iterates the fragment definitions in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &Node> {
        self.root.children_of(NodeKind::FragmentDefinition)
    }

    /// Finds a node by id.
    ///
    /// Descends from the root, picking at each level the last child whose id
    /// does not exceed `id`; that child's subtree is the only one that can
    /// hold it.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let mut current = &self.root;
        while current.id != id {
            let next = current.children.partition_point(|child| child.id <= id);
            current = current.children.get(next.checked_sub(1)?)?;
        }
        Some(current)
    }
}
