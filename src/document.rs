use std::sync::Arc;

use serde_json::json;

use crate::debug::DebugLogger;
use crate::error::PriceListError;
use crate::events::{DocumentEvent, Observer};
use crate::model::{
    Change, ClothId, ClothNode, GarmentSize, NodeKey, PriceListId, PriceListNode,
    TypeNode, TypeNodeId, default_sizes, move_within,
};
use crate::renumber::{RenumberStats, renumber};

/// Synchronous yes/no confirmation supplied by the host UI.
pub trait Prompt {
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

impl<F> Prompt for F
where
    F: FnMut(&str, &str) -> bool,
{
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Top,
    Back,
    Next,
    Last,
}

#[derive(Debug, Clone)]
struct Snapshot {
    price_lists: Vec<PriceListNode>,
    selected: Option<PriceListId>,
}

/// Root of the price list tree.
///
/// Every accepted mutation bubbles a [`Change`] up to here. The document then
/// publishes a [`DocumentEvent`], renumbers on structural changes and engages
/// the edit-mode latch, which stays on until [`Document::save`] or
/// [`Document::discard`].
pub struct Document {
    price_lists: Vec<PriceListNode>,
    selected: Option<PriceListId>,
    next_id: u64,
    default_sizes: Vec<GarmentSize>,
    editing: bool,
    snapshot: Option<Snapshot>,
    observers: Vec<Observer>,
    debug: Option<Arc<DebugLogger>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("price_lists", &self.price_lists)
            .field("selected", &self.selected)
            .field("editing", &self.editing)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            price_lists: Vec::new(),
            selected: None,
            next_id: 0,
            default_sizes: default_sizes(),
            editing: false,
            snapshot: None,
            observers: Vec::new(),
            debug: None,
        }
    }

    /// Sizes that every new type starts with.
    pub fn with_default_sizes(sizes: &[u32]) -> Result<Self, PriceListError> {
        let default_sizes = sizes
            .iter()
            .map(|value| GarmentSize::new(*value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            default_sizes,
            ..Self::new()
        })
    }

    pub(crate) fn set_debug(&mut self, debug: Arc<DebugLogger>) {
        self.debug = Some(debug);
    }

    pub fn price_lists(&self) -> &[PriceListNode] {
        &self.price_lists
    }

    pub fn is_empty(&self) -> bool {
        self.price_lists.is_empty()
    }

    pub fn price_list(&self, id: PriceListId) -> Option<&PriceListNode> {
        self.price_lists.iter().find(|node| node.id() == id)
    }

    pub fn cloth(&self, id: ClothId) -> Option<&ClothNode> {
        self.price_lists.iter().find_map(|node| node.find_cloth(id))
    }

    pub fn type_node(&self, id: TypeNodeId) -> Option<&TypeNode> {
        self.price_lists
            .iter()
            .flat_map(|node| node.cloths())
            .find_map(|cloth| cloth.find_type(id))
    }

    pub fn default_sizes(&self) -> &[GarmentSize] {
        &self.default_sizes
    }

    pub fn selected(&self) -> Option<PriceListId> {
        self.selected
    }

    pub fn selected_price_list(&self) -> Option<&PriceListNode> {
        self.selected.and_then(|id| self.price_list(id))
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&DocumentEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_price_list(&mut self, name: impl Into<String>) -> PriceListId {
        let checkpoint = self.checkpoint();
        let id = PriceListId(self.allocate_id());
        self.price_lists.push(PriceListNode::new(id, name));
        self.commit(
            checkpoint,
            Change::Structural,
            DocumentEvent::NodeAdded {
                node: NodeKey::PriceList(id),
                parent: None,
            },
        );
        if self.selected.is_none() {
            self.set_selected(Some(id));
        }
        id
    }

    pub fn add_cloth(
        &mut self,
        price_list: PriceListId,
        name: impl Into<String>,
    ) -> Result<ClothId, PriceListError> {
        let index = self.price_list_index(price_list)?;
        let checkpoint = self.checkpoint();
        let id = ClothId(self.allocate_id());
        let change = self.price_lists[index].push_cloth(ClothNode::new(id, name));
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeAdded {
                node: NodeKey::Cloth(id),
                parent: Some(NodeKey::PriceList(price_list)),
            },
        );
        Ok(id)
    }

    pub fn add_type(
        &mut self,
        cloth: ClothId,
        name: impl Into<String>,
    ) -> Result<TypeNodeId, PriceListError> {
        let (p, c) = self.cloth_index(cloth)?;
        let checkpoint = self.checkpoint();
        let id = TypeNodeId(self.allocate_id());
        let node = TypeNode::new(id, name, &self.default_sizes);
        let change = self.price_lists[p].cloths_mut()[c].push_type(node);
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeAdded {
                node: NodeKey::Type(id),
                parent: Some(NodeKey::Cloth(cloth)),
            },
        );
        Ok(id)
    }

    /// Removes a price list after the prompt confirms. Returns `false` when declined.
    pub fn delete_price_list(
        &mut self,
        id: PriceListId,
        prompt: &mut dyn Prompt,
    ) -> Result<bool, PriceListError> {
        let index = self.price_list_index(id)?;
        let message = format!(
            "Delete price list \"{}\" and all of its cloths and types?",
            self.price_lists[index].display_name()
        );
        if !prompt.confirm("Delete Price List", &message) {
            return Ok(false);
        }
        let checkpoint = self.checkpoint();
        let removed = self.price_lists.remove(index);
        self.commit(
            checkpoint,
            Change::Structural,
            DocumentEvent::NodeRemoved {
                node: NodeKey::PriceList(id),
                removed: removed.subtree_keys(),
            },
        );
        if self.selected == Some(id) {
            let neighbour = self
                .price_lists
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.price_lists.get(i)))
                .map(PriceListNode::id);
            self.set_selected(neighbour);
        }
        Ok(true)
    }

    pub fn delete_cloth(&mut self, id: ClothId) -> Result<(), PriceListError> {
        let (p, _) = self.cloth_index(id)?;
        let checkpoint = self.checkpoint();
        let (removed, change) = self.price_lists[p]
            .remove_cloth(id)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeRemoved {
                node: NodeKey::Cloth(id),
                removed: removed.subtree_keys(),
            },
        );
        Ok(())
    }

    pub fn delete_type(&mut self, id: TypeNodeId) -> Result<(), PriceListError> {
        let (p, c, _) = self.type_index(id)?;
        let checkpoint = self.checkpoint();
        let (_, change) = self.price_lists[p].cloths_mut()[c]
            .remove_type(id)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeRemoved {
                node: NodeKey::Type(id),
                removed: vec![NodeKey::Type(id)],
            },
        );
        Ok(())
    }

    pub fn rename(&mut self, node: NodeKey, name: impl Into<String>) -> Result<(), PriceListError> {
        let name = name.into();
        let checkpoint = self.checkpoint();
        let change = match node {
            NodeKey::PriceList(id) => {
                let index = self.price_list_index(id)?;
                self.price_lists[index].set_name(name)
            }
            NodeKey::Cloth(id) => {
                let (p, c) = self.cloth_index(id)?;
                self.price_lists[p].cloths_mut()[c].set_name(name)
            }
            NodeKey::Type(id) => self.type_mut(id)?.set_name(name),
        };
        self.commit(checkpoint, change, DocumentEvent::NodeEdited { node });
        Ok(())
    }

    pub fn add_size(&mut self, id: TypeNodeId) -> Result<GarmentSize, PriceListError> {
        let checkpoint = self.checkpoint();
        let (size, change) = self.type_mut(id)?.add_size();
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeEdited {
                node: NodeKey::Type(id),
            },
        );
        Ok(size)
    }

    /// Drops the last column. Returns `false` (and changes nothing) on an empty table.
    pub fn remove_size(&mut self, id: TypeNodeId) -> Result<bool, PriceListError> {
        let checkpoint = self.checkpoint();
        let Some(change) = self.type_mut(id)?.remove_size() else {
            return Ok(false);
        };
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeEdited {
                node: NodeKey::Type(id),
            },
        );
        Ok(true)
    }

    pub fn set_size(
        &mut self,
        id: TypeNodeId,
        column: usize,
        raw: &str,
    ) -> Result<(), PriceListError> {
        let checkpoint = self.checkpoint();
        let change = self.type_mut(id)?.set_size(column, raw)?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeEdited {
                node: NodeKey::Type(id),
            },
        );
        Ok(())
    }

    pub fn set_rate(
        &mut self,
        id: TypeNodeId,
        column: usize,
        raw: &str,
    ) -> Result<(), PriceListError> {
        let checkpoint = self.checkpoint();
        let change = self.type_mut(id)?.set_rate(column, raw)?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeEdited {
                node: NodeKey::Type(id),
            },
        );
        Ok(())
    }

    pub fn move_price_list(&mut self, id: PriceListId, to: usize) -> Result<(), PriceListError> {
        let checkpoint = self.checkpoint();
        let change = move_within(&mut self.price_lists, |node| node.id() == id, to)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))?;
        let index = self.price_list_index(id)?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeMoved {
                node: NodeKey::PriceList(id),
                index,
            },
        );
        Ok(())
    }

    pub fn move_cloth(&mut self, id: ClothId, to: usize) -> Result<(), PriceListError> {
        let (p, _) = self.cloth_index(id)?;
        let checkpoint = self.checkpoint();
        let change = self.price_lists[p]
            .move_cloth(id, to)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))?;
        let (_, index) = self.cloth_index(id)?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeMoved {
                node: NodeKey::Cloth(id),
                index,
            },
        );
        Ok(())
    }

    pub fn move_type(&mut self, id: TypeNodeId, to: usize) -> Result<(), PriceListError> {
        let (p, c, _) = self.type_index(id)?;
        let checkpoint = self.checkpoint();
        let change = self.price_lists[p].cloths_mut()[c]
            .move_type(id, to)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))?;
        let (_, _, index) = self.type_index(id)?;
        self.commit(
            checkpoint,
            change,
            DocumentEvent::NodeMoved {
                node: NodeKey::Type(id),
                index,
            },
        );
        Ok(())
    }

    /// Whole-tree ordinal recompute. Safe to call at any time.
    pub fn renumber(&mut self) -> RenumberStats {
        let stats = renumber(&mut self.price_lists);
        if let Some(logger) = self.debug.as_deref() {
            logger.log_event(
                "renumber.pass",
                json!({
                    "price_lists": stats.price_lists,
                    "cloths": stats.cloths,
                    "types": stats.types,
                }),
            );
            logger.increment("renumber.pass", 1);
        }
        self.emit(DocumentEvent::Renumbered);
        stats
    }

    pub fn select(&mut self, id: PriceListId) -> Result<(), PriceListError> {
        self.price_list_index(id)?;
        self.set_selected(Some(id));
        Ok(())
    }

    /// Moves the selection; with nothing selected, Top/Next start at the first
    /// price list and Back/Last at the last one.
    pub fn navigate(&mut self, to: Navigation) -> Option<PriceListId> {
        let len = self.price_lists.len();
        if len == 0 {
            return None;
        }
        let current = self
            .selected
            .and_then(|id| self.price_lists.iter().position(|node| node.id() == id));
        let target = match (to, current) {
            (Navigation::Top, _) | (Navigation::Next, None) => 0,
            (Navigation::Last, _) | (Navigation::Back, None) => len - 1,
            (Navigation::Next, Some(index)) => (index + 1).min(len - 1),
            (Navigation::Back, Some(index)) => index.saturating_sub(1),
        };
        let id = self.price_lists[target].id();
        self.set_selected(Some(id));
        Some(id)
    }

    /// Engages edit mode without touching the tree. Returns `false` if already editing.
    pub fn begin_edit(&mut self) -> bool {
        if self.editing {
            return false;
        }
        let checkpoint = self.checkpoint();
        self.engage(checkpoint);
        true
    }

    /// Leaves edit mode keeping the current tree. Nothing is persisted.
    pub fn save(&mut self) -> bool {
        if !self.editing {
            return false;
        }
        self.editing = false;
        self.snapshot = None;
        if let Some(logger) = self.debug.as_deref() {
            logger.log_event("edit.save", json!({ "price_lists": self.price_lists.len() }));
        }
        self.emit(DocumentEvent::EditModeChanged { editing: false });
        true
    }

    /// Leaves edit mode restoring the tree as it was when edit mode began.
    pub fn discard(&mut self) -> bool {
        if !self.editing {
            return false;
        }
        self.editing = false;
        if let Some(snapshot) = self.snapshot.take() {
            self.price_lists = snapshot.price_lists;
            self.emit(DocumentEvent::Reverted);
            self.renumber();
            self.set_selected(snapshot.selected);
        }
        if let Some(logger) = self.debug.as_deref() {
            logger.log_event("edit.discard", json!({ "price_lists": self.price_lists.len() }));
        }
        self.emit(DocumentEvent::EditModeChanged { editing: false });
        true
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // Tree state to restore on discard; only captured when edit mode is about to begin.
    fn checkpoint(&self) -> Option<Snapshot> {
        if self.editing {
            return None;
        }
        Some(Snapshot {
            price_lists: self.price_lists.clone(),
            selected: self.selected,
        })
    }

    fn commit(&mut self, checkpoint: Option<Snapshot>, change: Change, event: DocumentEvent) {
        self.emit(event);
        if change == Change::Structural {
            self.renumber();
        }
        self.engage(checkpoint);
    }

    fn engage(&mut self, checkpoint: Option<Snapshot>) {
        if self.editing {
            return;
        }
        self.editing = true;
        self.snapshot = checkpoint;
        self.emit(DocumentEvent::EditModeChanged { editing: true });
    }

    fn set_selected(&mut self, selected: Option<PriceListId>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;
        self.emit(DocumentEvent::SelectionChanged { selected });
    }

    fn emit(&mut self, event: DocumentEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn price_list_index(&self, id: PriceListId) -> Result<usize, PriceListError> {
        self.price_lists
            .iter()
            .position(|node| node.id() == id)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))
    }

    fn cloth_index(&self, id: ClothId) -> Result<(usize, usize), PriceListError> {
        self.price_lists
            .iter()
            .enumerate()
            .find_map(|(p, node)| {
                node.cloths()
                    .iter()
                    .position(|cloth| cloth.id() == id)
                    .map(|c| (p, c))
            })
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))
    }

    fn type_index(&self, id: TypeNodeId) -> Result<(usize, usize, usize), PriceListError> {
        for (p, price_list) in self.price_lists.iter().enumerate() {
            for (c, cloth) in price_list.cloths().iter().enumerate() {
                if let Some(t) = cloth.types().iter().position(|node| node.id() == id) {
                    return Ok((p, c, t));
                }
            }
        }
        Err(PriceListError::NodeNotFound(id.to_string()))
    }

    fn type_mut(&mut self, id: TypeNodeId) -> Result<&mut TypeNode, PriceListError> {
        let (p, c, _) = self.type_index(id)?;
        self.price_lists[p].cloths_mut()[c]
            .find_type_mut(id)
            .ok_or_else(|| PriceListError::NodeNotFound(id.to_string()))
    }
}
