//! Format-agnostic traversal of parsed documents.
//!
//! A parsed document may span several XML parts (an OOXML presentation keeps
//! every slide in its own part). [`NodeRef`] addresses a node in any part and
//! [`DocumentTree`] is the navigation contract each format implements.
//! [`DocumentCursor`] is the copyable position the translator walks with.

use crate::common::xml::{Attribute, NodeId};
use std::fmt;

/// A node inside one of a document's XML parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub part: usize,
    pub node: NodeId,
}

impl NodeRef {
    pub fn new(part: usize, node: NodeId) -> Self {
        Self { part, node }
    }
}

/// Navigation over a format-specific parsed tree.
pub trait DocumentTree {
    /// Entry point of the document content.
    fn root(&self) -> NodeRef;

    /// Qualified element name; `None` for text nodes.
    fn name(&self, node: NodeRef) -> Option<&str>;

    /// Character data of a text node.
    fn text(&self, node: NodeRef) -> Option<&str>;

    fn attributes(&self, node: NodeRef) -> &[Attribute];

    fn first_child(&self, node: NodeRef) -> Option<NodeRef>;

    fn next_sibling(&self, node: NodeRef) -> Option<NodeRef>;

    fn parent(&self, node: NodeRef) -> Option<NodeRef>;
}

/// Read-only position in a [`DocumentTree`].
///
/// Cursors borrow the document they walk and never outlive it. Two cursors
/// are equal when they point at the same node of the same document.
#[derive(Clone, Copy)]
pub struct DocumentCursor<'a> {
    tree: &'a dyn DocumentTree,
    node: NodeRef,
}

impl<'a> DocumentCursor<'a> {
    pub fn new(tree: &'a dyn DocumentTree, node: NodeRef) -> Self {
        Self { tree, node }
    }

    /// Cursor at the document root.
    pub fn root(tree: &'a dyn DocumentTree) -> Self {
        Self::new(tree, tree.root())
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    pub fn name(&self) -> Option<&'a str> {
        self.tree.name(self.node)
    }

    pub fn is_element(&self) -> bool {
        self.name().is_some()
    }

    pub fn text(&self) -> Option<&'a str> {
        self.tree.text(self.node)
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        self.tree.attributes(self.node)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute parsed as an unsigned count, `default` if absent or invalid.
    pub fn count_attribute(&self, name: &str, default: u32) -> u32 {
        self.attribute(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn parent(&self) -> Option<Self> {
        self.tree.parent(self.node).map(|node| self.with(node))
    }

    pub fn first_child(&self) -> Option<Self> {
        self.tree.first_child(self.node).map(|node| self.with(node))
    }

    pub fn next_sibling(&self) -> Option<Self> {
        self.tree.next_sibling(self.node).map(|node| self.with(node))
    }

    /// Lazily iterate the children; calling it again restarts from the first.
    pub fn children(&self) -> CursorChildren<'a> {
        CursorChildren {
            next: self.first_child(),
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<Self> {
        self.children().find(|c| c.name() == Some(name))
    }

    /// Follow a chain of child element names.
    pub fn path(&self, names: &[&str]) -> Option<Self> {
        names.iter().try_fold(*self, |cursor, name| cursor.child(name))
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = self.text() {
            out.push_str(text);
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }

    fn with(&self, node: NodeRef) -> Self {
        Self {
            tree: self.tree,
            node,
        }
    }
}

impl PartialEq for DocumentCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && std::ptr::addr_eq(self.tree, other.tree)
    }
}

impl Eq for DocumentCursor<'_> {}

impl fmt::Debug for DocumentCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("node", &self.node)
            .field("name", &self.name())
            .finish()
    }
}

pub struct CursorChildren<'a> {
    next: Option<DocumentCursor<'a>>,
}

impl<'a> Iterator for CursorChildren<'a> {
    type Item = DocumentCursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
