//! Editor view model.
//!
//! The buffer is a snapshot taken on open. Typing only touches the buffer;
//! the item and every reader of the store stay unchanged until `save`.

use crate::model::item::ItemId;
use crate::store::{PersistenceError, StoreController};
use log::warn;

/// Editable buffer for one item's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    item: ItemId,
    buffer: String,
}

impl EditorView {
    /// Opens the editor with the item's current note (empty when unset).
    pub fn open(store: &StoreController, id: ItemId) -> Result<Self, PersistenceError> {
        let item = store.item(id).ok_or(PersistenceError::UnknownItem(id))?;
        Ok(Self {
            item: id,
            buffer: item.note_text().to_string(),
        })
    }

    pub fn item_id(&self) -> ItemId {
        self.item
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replaces the buffer contents.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Returns whether the buffer differs from the item's current note.
    pub fn is_dirty(&self, store: &StoreController) -> bool {
        store
            .item(self.item)
            .map_or(true, |item| item.note_text() != self.buffer)
    }

    /// Writes the buffer into the item and saves.
    ///
    /// # Errors
    /// On failure the item's note is put back, the buffer is kept for a
    /// retry, and the error is returned.
    pub fn save(&self, store: &mut StoreController) -> Result<(), PersistenceError> {
        let checkpoint = store.checkpoint();
        store.set_note(self.item, self.buffer.clone())?;
        if let Err(err) = store.save() {
            warn!(
                "event=editor_save module=view status=error item_id={} error_code={}",
                self.item,
                err.code()
            );
            store.restore(checkpoint);
            return Err(err);
        }
        Ok(())
    }
}
