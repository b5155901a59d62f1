//! Arena-backed XML element tree.
//!
//! Package parts (ODF `content.xml`, OOXML parts) are parsed once into an
//! [`XmlDocument`]; nodes are addressed by [`NodeId`] and never move, so
//! cursors can hold plain indices while the document owns every node.

use super::escape::{escape_text, escape_xml};
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Index of a node inside an [`XmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Qualified attribute name and its unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

/// A parsed XML part.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlDocument {
    /// Parse a complete XML part.
    ///
    /// Text runs consisting only of whitespace are dropped; entity and
    /// character references are resolved into the surrounding text.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut builder = TreeBuilder::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    builder.flush_text();
                    let (name, attributes) = read_element(e)?;
                    builder.open(name, attributes)?;
                },
                Ok(Event::Empty(ref e)) => {
                    builder.flush_text();
                    let (name, attributes) = read_element(e)?;
                    builder.open(name, attributes)?;
                    builder.close();
                },
                Ok(Event::End(_)) => {
                    builder.flush_text();
                    builder.close();
                },
                Ok(Event::Text(ref t)) => {
                    builder.pending.push_str(&String::from_utf8_lossy(t));
                },
                Ok(Event::CData(ref t)) => {
                    builder.pending.push_str(&String::from_utf8_lossy(t));
                },
                Ok(Event::GeneralRef(ref r)) => {
                    if let Ok(Some(ch)) = r.resolve_char_ref() {
                        builder.pending.push(ch);
                    } else {
                        let name = String::from_utf8_lossy(r);
                        match quick_xml::escape::resolve_xml_entity(&name) {
                            Some(resolved) => builder.pending.push_str(resolved),
                            None => {
                                builder.pending.push('&');
                                builder.pending.push_str(&name);
                                builder.pending.push(';');
                            },
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        builder.finish()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Qualified element name, `None` for text nodes.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text(_) => None,
        }
    }

    /// Text of a text node, `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).data {
            NodeData::Element { attributes, .. } => attributes,
            NodeData::Text(_) => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// First child element with the given qualified name.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).find(|&c| self.name(c) == Some(name))
    }

    /// Nodes below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// First descendant element with the given qualified name.
    pub fn find(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id).find(|&c| self.name(c) == Some(name))
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the content of a text node. Returns `false` for elements.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> bool {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.data) {
            Some(NodeData::Text(text)) => {
                text.clear();
                text.push_str(value);
                true
            },
            _ => false,
        }
    }

    /// Serialize back to an XML document with a UTF-8 declaration.
    pub fn to_xml(&self) -> String {
        self.to_xml_without(&[])
    }

    /// Serialize, leaving out the elements named in `skipped` together with
    /// everything below them.
    pub fn to_xml_without(&self, skipped: &[&str]) -> String {
        let mut xml = String::with_capacity(self.nodes.len() * 32);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_node(self.root, skipped, &mut xml);
        xml
    }

    fn write_node(&self, id: NodeId, skipped: &[&str], xml: &mut String) {
        match &self.node(id).data {
            NodeData::Text(text) => xml.push_str(&escape_text(text)),
            NodeData::Element { name, .. } if skipped.contains(&name.as_str()) => {},
            NodeData::Element { name, attributes } => {
                xml.push('<');
                xml.push_str(name);
                for attr in attributes {
                    xml.push(' ');
                    xml.push_str(&attr.name);
                    xml.push_str("=\"");
                    xml.push_str(&escape_xml(&attr.value));
                    xml.push('"');
                }
                if self.first_child(id).is_none() {
                    xml.push_str("/>");
                    return;
                }
                xml.push('>');
                for child in self.children(id) {
                    self.write_node(child, skipped, xml);
                }
                xml.push_str("</");
                xml.push_str(name);
                xml.push('>');
            },
        }
    }
}

fn read_element(e: &BytesStart<'_>) -> Result<(String, Vec<Attribute>)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)?.into_owned();
        attributes.push(Attribute { name: key, value });
    }
    Ok((name, attributes))
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    pending: String,
}

impl TreeBuilder {
    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(Node {
            data,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
        });
        if let Some(parent) = parent {
            let prev = self.nodes[parent.index()].last_child;
            match prev {
                Some(prev) => self.nodes[prev.index()].next_sibling = Some(id),
                None => self.nodes[parent.index()].first_child = Some(id),
            }
            self.nodes[parent.index()].last_child = Some(id);
        }
        id
    }

    fn open(&mut self, name: String, attributes: Vec<Attribute>) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::Xml("multiple root elements".to_string()));
        }
        let id = self.push(NodeData::Element { name, attributes });
        if self.root.is_none() {
            self.root = Some(id);
        }
        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self) {
        self.stack.pop();
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        // whitespace-only runs and text outside the root are not content
        if self.stack.is_empty() || text.trim().is_empty() {
            return;
        }
        self.push(NodeData::Text(text));
    }

    fn finish(mut self) -> Result<XmlDocument> {
        self.flush_text();
        let root = self
            .root
            .ok_or_else(|| Error::Xml("no root element found".to_string()))?;
        Ok(XmlDocument {
            nodes: self.nodes,
            root,
        })
    }
}

pub struct Children<'a> {
    doc: &'a XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a XmlDocument,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = if let Some(child) = self.doc.first_child(current) {
            Some(child)
        } else {
            let mut node = current;
            loop {
                if node == self.root {
                    break None;
                }
                if let Some(sibling) = self.doc.next_sibling(node) {
                    break Some(sibling);
                }
                match self.doc.parent(node) {
                    Some(parent) if parent != self.root => node = parent,
                    _ => break None,
                }
            }
        };
        Some(current)
    }
}
