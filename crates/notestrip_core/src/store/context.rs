//! In-memory working context: an arena of items keyed by `ItemId` plus
//! the set of changes staged since the last commit.

use crate::model::item::{Item, ItemId};
use std::collections::{BTreeSet, HashMap};

/// Staging area for item changes that have not been committed yet.
#[derive(Debug, Clone, Default)]
pub struct WorkingContext {
    items: HashMap<ItemId, Item>,
    /// Unsaved creates, in creation order.
    inserted: Vec<ItemId>,
    /// Committed items whose note was replaced.
    edited: BTreeSet<ItemId>,
    /// Committed items marked for removal; already gone from `items`.
    deleted: BTreeSet<ItemId>,
}

/// Owned copy of the staged changes, in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub inserted: Vec<Item>,
    pub edited: Vec<(ItemId, Option<String>)>,
    pub deleted: Vec<ItemId>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.edited.is_empty() && self.deleted.is_empty()
    }
}

/// Saved copy of a whole working context, restorable after a failed save.
#[derive(Debug, Clone)]
pub struct ContextCheckpoint(WorkingContext);

impl WorkingContext {
    /// Builds a clean context mirroring committed items.
    pub fn from_committed(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        !(self.inserted.is_empty() && self.edited.is_empty() && self.deleted.is_empty())
    }

    /// Registers a new, not yet durable item.
    pub fn insert_new(&mut self, item: Item) {
        self.inserted.push(item.id);
        self.items.insert(item.id, item);
    }

    /// Stages a full replacement of the note. Returns `false` for unknown keys.
    pub fn set_note(&mut self, id: ItemId, text: String) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        item.replace_note(text);
        if !self.inserted.contains(&id) {
            self.edited.insert(id);
        }
        true
    }

    /// Marks an item for removal. Unsaved items are dropped outright.
    /// Returns `false` for unknown keys.
    pub fn delete(&mut self, id: ItemId) -> bool {
        if self.items.remove(&id).is_none() {
            return false;
        }
        if let Some(position) = self.inserted.iter().position(|pending| *pending == id) {
            self.inserted.remove(position);
        } else {
            self.edited.remove(&id);
            self.deleted.insert(id);
        }
        true
    }

    /// Copies the staged changes out in the order they must be applied.
    pub fn pending(&self) -> PendingChanges {
        PendingChanges {
            inserted: self
                .inserted
                .iter()
                .filter_map(|id| self.items.get(id).cloned())
                .collect(),
            edited: self
                .edited
                .iter()
                .filter_map(|id| self.items.get(id).map(|item| (*id, item.note.clone())))
                .collect(),
            deleted: self.deleted.iter().copied().collect(),
        }
    }

    pub fn checkpoint(&self) -> ContextCheckpoint {
        ContextCheckpoint(self.clone())
    }

    pub fn restore(&mut self, checkpoint: ContextCheckpoint) {
        *self = checkpoint.0;
    }
}
