use std::cell::RefCell;
use std::rc::Rc;

use crate::model::{NodeKey, PriceListId};

/// Notifications published by the document after each accepted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    NodeAdded {
        node: NodeKey,
        parent: Option<NodeKey>,
    },
    // `removed` lists the node itself followed by all of its descendants.
    NodeRemoved {
        node: NodeKey,
        removed: Vec<NodeKey>,
    },
    NodeEdited {
        node: NodeKey,
    },
    NodeMoved {
        node: NodeKey,
        index: usize,
    },
    Renumbered,
    SelectionChanged {
        selected: Option<PriceListId>,
    },
    EditModeChanged {
        editing: bool,
    },
    Reverted,
}

pub type Observer = Box<dyn FnMut(&DocumentEvent)>;

/// Shared buffer a consumer subscribes to the document and drains at its own
/// pace. Only events published after subscribing are kept.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<Vec<DocumentEvent>>>,
}

impl EventQueue {
    pub fn sink(&self) -> impl FnMut(&DocumentEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event| events.borrow_mut().push(event.clone())
    }

    /// Events received since the last drain, oldest first.
    pub fn drain(&self) -> Vec<DocumentEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}
