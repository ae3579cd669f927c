use std::collections::BTreeMap;

use crate::events::DocumentEvent;
use crate::model::NodeKey;

/// Expanded/collapsed flags per node. Presentation only; printing ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: BTreeMap<NodeKey, bool>,
}

impl ViewState {
    // Unknown nodes render expanded, matching how new sections open.
    pub fn is_expanded(&self, node: NodeKey) -> bool {
        self.expanded.get(&node).copied().unwrap_or(true)
    }

    pub fn set_expanded(&mut self, node: NodeKey, expanded: bool) {
        self.expanded.insert(node, expanded);
    }

    pub fn toggle(&mut self, node: NodeKey) -> bool {
        let expanded = !self.is_expanded(node);
        self.set_expanded(node, expanded);
        expanded
    }

    pub fn tracked(&self) -> usize {
        self.expanded.len()
    }

    pub fn observe(&mut self, event: &DocumentEvent) {
        match event {
            DocumentEvent::NodeAdded { node, parent } => {
                self.set_expanded(*node, true);
                if let (NodeKey::Type(_), Some(cloth)) = (node, parent) {
                    self.set_expanded(*cloth, true);
                }
            }
            DocumentEvent::NodeRemoved { removed, .. } => {
                for key in removed {
                    self.expanded.remove(key);
                }
            }
            DocumentEvent::Reverted => self.expanded.clear(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::events::EventQueue;

    #[test]
    fn adding_a_type_reopens_its_cloth() {
        let queue = EventQueue::default();
        let mut doc = Document::new();
        doc.subscribe(queue.sink());
        let mut view = ViewState::default();
        let pl = doc.add_price_list("pl");
        let cloth = doc.add_cloth(pl, "cloth").expect("cloth");
        for event in queue.drain() {
            view.observe(&event);
        }
        assert!(!view.toggle(NodeKey::Cloth(cloth)));
        assert!(!view.is_expanded(NodeKey::Cloth(cloth)));

        let node = doc.add_type(cloth, "t").expect("type");
        for event in queue.drain() {
            view.observe(&event);
        }
        assert!(view.is_expanded(NodeKey::Cloth(cloth)));
        assert!(view.is_expanded(NodeKey::Type(node)));
    }

    #[test]
    fn removed_nodes_drop_their_flags() {
        let queue = EventQueue::default();
        let mut doc = Document::new();
        doc.subscribe(queue.sink());
        let mut view = ViewState::default();
        let pl = doc.add_price_list("pl");
        let cloth = doc.add_cloth(pl, "cloth").expect("cloth");
        doc.add_type(cloth, "t").expect("type");
        for event in queue.drain() {
            view.observe(&event);
        }
        assert_eq!(view.tracked(), 3);
        doc.delete_cloth(cloth).expect("delete");
        for event in queue.drain() {
            view.observe(&event);
        }
        assert_eq!(view.tracked(), 1);
    }
}
