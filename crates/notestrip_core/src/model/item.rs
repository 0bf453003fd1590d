//! Item domain model.
//!
//! # Responsibility
//! - Define the single persisted note record shown on the strip.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `timestamp` is set once at creation and never changes.
//! - `note` is only ever replaced whole.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one item.
pub type ItemId = Uuid;

/// One note on the strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Creation time, Unix epoch milliseconds.
    pub timestamp: i64,
    /// Free-text body. `None` until the first editor save.
    pub note: Option<String>,
}

impl Item {
    /// Creates an item with a fresh random ID and no note.
    pub fn new(timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            note: None,
        }
    }

    /// Returns the note body, treating a missing note as empty.
    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }

    /// Replaces the note body.
    pub fn replace_note(&mut self, text: impl Into<String>) {
        self.note = Some(text.into());
    }
}
