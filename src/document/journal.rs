//! Record of the text nodes emitted as editable spans.
//!
//! Each editable span carries a sequential id (`data-odr-cid`); the browser
//! reports edits back keyed by that id and the journal maps it to the text
//! node that produced the span.

use super::cursor::NodeRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditJournal {
    nodes: Vec<NodeRef>,
}

impl EditJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text node and return its id.
    pub fn record(&mut self, node: NodeRef) -> u32 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    pub fn get(&self, id: u32) -> Option<NodeRef> {
        self.nodes.get(id as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(id, node)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, NodeRef)> + '_ {
        self.nodes.iter().enumerate().map(|(i, &n)| (i as u32, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::NodeId;

    #[test]
    fn test_ids_are_sequential() {
        let mut journal = EditJournal::new();
        assert!(journal.is_empty());
        let a = NodeRef::new(0, NodeId::from_index(4));
        let b = NodeRef::new(0, NodeId::from_index(9));
        assert_eq!(journal.record(a), 0);
        assert_eq!(journal.record(b), 1);
        assert_eq!(journal.get(1), Some(b));
        assert_eq!(journal.get(2), None);
        assert_eq!(journal.iter().collect::<Vec<_>>(), vec![(0, a), (1, b)]);
    }
}
