//! The structural model of a declarative UI source unit.
//!
//! A [`SourceUnit`] is produced by an external front-end from raw UI
//! source and is read-only to this crate. The core defines only the
//! model's shape, never the grammar that produces it.
//!
//! # Ingest contract
//!
//! Front-ends must encode source constructs as follows:
//!
//! - A component's primary rendering function is a child [`NodeKind::Function`]
//!   named `body`.
//! - A property's initializer expression is its child subtree: call
//!   expressions are [`NodeKind::ModifierCall`] nodes, bare value
//!   references are [`NodeKind::Identifier`] nodes.
//! - Property wrappers and attributes become [`Annotation`]s
//!   (`State`, `ObservedObject`, `MainActor`, `nonisolated`, ...).
//! - A closure's capture list is the `capture` annotation with args
//!   such as `["weak", "self"]`; asynchronous execution is the
//!   `async` annotation; a leading liveness guard is summarised as
//!   the `early-exit` annotation.
//! - List construction is a node named `ForEach` whose `id`
//!   annotation carries the identity key path.
//! - An explicit isolation hop is a [`NodeKind::ModifierCall`] named
//!   `<Domain>.run`, e.g. `MainActor.run`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The kind of a structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A view/component declaration.
    Component,
    /// A named function, including a component's `body`.
    Function,
    /// An anonymous closure expression.
    Closure,
    /// A stored property declaration.
    PropertyDeclaration,
    /// A standalone annotation usage site.
    AnnotationUse,
    /// A call in a modifier chain, or any call expression.
    ModifierCall,
    /// A bare name reference.
    Identifier,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Component => "component",
            Self::Function => "function",
            Self::Closure => "closure",
            Self::PropertyDeclaration => "property",
            Self::AnnotationUse => "annotation",
            Self::ModifierCall => "modifier-call",
            Self::Identifier => "identifier",
        };
        write!(f, "{s}")
    }
}

/// A source span: file plus 1-indexed start/end line and column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// First line of the span (1-indexed).
    pub start_line: usize,
    /// First column of the span (1-indexed).
    pub start_col: usize,
    /// Last line of the span (1-indexed, inclusive).
    pub end_line: usize,
    /// Last column of the span (1-indexed, inclusive).
    pub end_col: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            file: file.into(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the (line, column) pair where the span starts.
    #[must_use]
    pub fn start(&self) -> (usize, usize) {
        (self.start_line, self.start_col)
    }

    /// Returns the (line, column) pair where the span ends.
    #[must_use]
    pub fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_col)
    }

    /// Tests whether this span fully contains `other`.
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.file == other.file && self.start() <= other.start() && other.end() <= self.end()
    }

    /// Tests whether this span contains the given position.
    #[must_use]
    pub fn contains_pos(&self, line: usize, col: usize) -> bool {
        self.start() <= (line, col) && (line, col) <= self.end()
    }

    /// Tests whether this span ends strictly before `other` starts.
    #[must_use]
    pub fn precedes(&self, other: &Span) -> bool {
        self.end() < other.start()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.start_line,
            self.start_col
        )
    }
}

/// An annotation attached to a node (property wrapper, attribute, ...).
///
/// Argument order is the source order; lookup by name never depends
/// on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name without sigils (e.g. `State`, `MainActor`).
    pub name: String,
    /// Ordered annotation arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Annotation {
    /// Creates a new annotation.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A structural unit of the model tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// What this node represents.
    pub kind: NodeKind,
    /// Declared name, if the construct has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Source span of the whole construct.
    pub span: Span,
    /// Annotations in source order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Children ordered by source position.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a new node without name, annotations or children.
    #[must_use]
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            name: None,
            span,
            annotations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends an annotation.
    #[must_use]
    pub fn with_annotation(mut self, name: impl Into<String>, args: Vec<String>) -> Self {
        self.annotations.push(Annotation::new(name, args));
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the node name, or `""` when unnamed.
    #[must_use]
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Looks up an annotation by name (order-independent).
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Tests whether an annotation with the given name is present.
    #[must_use]
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// Iterates the subtree below this node in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Finds the innermost node containing the given position.
    #[must_use]
    pub fn find_at(&self, line: usize, col: usize) -> Option<&Node> {
        if !self.span.contains_pos(line, col) {
            return None;
        }
        self.children
            .iter()
            .find_map(|c| c.find_at(line, col))
            .or(Some(self))
    }
}

/// Pre-order iterator over a node's descendants.
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

/// One source unit as supplied by the external front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Raw source text of the unit.
    pub source: String,
    /// Root of the structural tree.
    pub root: Node,
}

impl SourceUnit {
    /// Creates a new source unit.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, source: impl Into<String>, root: Node) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            root,
        }
    }

    /// Parses a unit from its JSON ingestion format.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Ingest`] when the document is not a
    /// valid unit.
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        serde_json::from_str(content).map_err(|e| ModelError::Ingest {
            message: e.to_string(),
        })
    }

    /// Validates structural invariants once at ingestion.
    ///
    /// A unit whose spans violate containment or sibling ordering is
    /// rejected as a whole; the core never analyzes partial or
    /// corrupt structure. Cycles are unrepresentable because children
    /// are owned.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Malformed`] naming the offending node.
    pub fn validate(&self) -> Result<(), ModelError> {
        Self::validate_node(&self.root)
    }

    fn validate_node(node: &Node) -> Result<(), ModelError> {
        for pair in node.children.windows(2) {
            if !pair[0].span.precedes(&pair[1].span) {
                return Err(ModelError::Malformed {
                    span: pair[1].span.clone(),
                    detail: format!(
                        "sibling {} at {} overlaps or precedes its predecessor",
                        pair[1].kind, pair[1].span
                    ),
                });
            }
        }
        for child in &node.children {
            if !node.span.contains(&child.span) {
                return Err(ModelError::Malformed {
                    span: child.span.clone(),
                    detail: format!(
                        "child {} at {} escapes its parent span {}",
                        child.kind, child.span, node.span
                    ),
                });
            }
            Self::validate_node(child)?;
        }
        Ok(())
    }
}

/// Errors raised while ingesting or validating a structural model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The unit document could not be decoded at all.
    #[error("failed to decode model document: {message}")]
    Ingest {
        /// Decoder error message.
        message: String,
    },

    /// The supplied tree violates span containment or ordering.
    #[error("malformed model at {span}: {detail}")]
    Malformed {
        /// Span of the offending node.
        span: Span,
        /// What invariant was violated.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(l1: usize, c1: usize, l2: usize, c2: usize) -> Span {
        Span::new("View.ui", l1, c1, l2, c2)
    }

    fn valid_unit() -> SourceUnit {
        let root = Node::new(NodeKind::Component, sp(1, 1, 10, 2))
            .with_name("ProfileView")
            .with_child(
                Node::new(NodeKind::PropertyDeclaration, sp(2, 5, 2, 30)).with_name("name"),
            )
            .with_child(Node::new(NodeKind::Function, sp(4, 5, 9, 6)).with_name("body"));
        SourceUnit::new("View.ui", "", root)
    }

    #[test]
    fn valid_tree_passes_validation() {
        assert!(valid_unit().validate().is_ok());
    }

    #[test]
    fn escaping_child_is_rejected() {
        let root = Node::new(NodeKind::Component, sp(1, 1, 5, 2))
            .with_child(Node::new(NodeKind::Function, sp(4, 1, 9, 2)));
        let unit = SourceUnit::new("View.ui", "", root);
        assert!(matches!(
            unit.validate(),
            Err(ModelError::Malformed { .. })
        ));
    }

    #[test]
    fn overlapping_siblings_are_rejected() {
        let root = Node::new(NodeKind::Component, sp(1, 1, 10, 2))
            .with_child(Node::new(NodeKind::PropertyDeclaration, sp(2, 1, 4, 2)))
            .with_child(Node::new(NodeKind::Function, sp(3, 1, 8, 2)));
        let unit = SourceUnit::new("View.ui", "", root);
        assert!(unit.validate().is_err());
    }

    #[test]
    fn find_at_returns_innermost() {
        let unit = valid_unit();
        let hit = unit.root.find_at(2, 10).map(|n| n.kind);
        assert_eq!(hit, Some(NodeKind::PropertyDeclaration));
        let hit = unit.root.find_at(3, 1).map(|n| n.kind);
        assert_eq!(hit, Some(NodeKind::Component));
        assert!(unit.root.find_at(99, 1).is_none());
    }

    #[test]
    fn annotation_lookup_ignores_order() {
        let node = Node::new(NodeKind::PropertyDeclaration, sp(1, 1, 1, 20))
            .with_annotation("State", vec![])
            .with_annotation("capture", vec!["weak".into(), "self".into()]);
        assert!(node.has_annotation("State"));
        assert_eq!(
            node.annotation("capture").map(|a| a.args.len()),
            Some(2)
        );
        assert!(node.annotation("Binding").is_none());
    }

    #[test]
    fn descendants_is_preorder() {
        let unit = valid_unit();
        let kinds: Vec<NodeKind> = unit.root.descendants().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::PropertyDeclaration, NodeKind::Function]);
    }

    #[test]
    fn unit_roundtrips_through_json() {
        let unit = valid_unit();
        let json = serde_json::to_string(&unit).expect("serialize");
        let back = SourceUnit::from_json(&json).expect("deserialize");
        assert_eq!(back.root, unit.root);
    }

    #[test]
    fn bad_json_is_an_ingest_error() {
        assert!(matches!(
            SourceUnit::from_json("{ not json"),
            Err(ModelError::Ingest { .. })
        ));
    }
}
