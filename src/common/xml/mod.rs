//! XML helpers: HTML/XML escaping and the arena element tree used by the
//! document model.

pub mod escape;
pub mod tree;

pub use escape::{escape_attribute, escape_text, escape_xml};
pub use tree::{Attribute, NodeData, NodeId, XmlDocument};
