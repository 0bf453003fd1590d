//! Strip (browse) view model.

use crate::model::item::{Item, ItemId};
use crate::store::{PersistenceError, StoreController};
use crate::view::editor::EditorView;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::mpsc::{Receiver, TryRecvError};

const CAPTION_MAX_CHARS: usize = 40;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One renderable entry on the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: ItemId,
    /// Creation time, Unix epoch milliseconds.
    pub timestamp: i64,
    /// Single-line note preview; empty for notes never written.
    pub caption: String,
}

impl Tile {
    fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            timestamp: item.timestamp,
            caption: caption_for(item.note_text()),
        }
    }
}

/// Horizontally ordered strip of all committed items.
pub struct BrowseView {
    updates: Receiver<Vec<Item>>,
    tiles: Vec<Tile>,
}

impl BrowseView {
    /// Subscribes to `store` and loads the current snapshot.
    pub fn new(store: &mut StoreController) -> Result<Self, PersistenceError> {
        let mut view = Self {
            updates: store.subscribe()?,
            tiles: Vec::new(),
        };
        view.refresh();
        Ok(view)
    }

    /// Applies the newest published snapshot, if any.
    ///
    /// Returns whether the tiles changed.
    pub fn refresh(&mut self) -> bool {
        let mut latest = None;
        loop {
            match self.updates.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("event=browse_refresh module=view status=error error_code=store_closed");
                    break;
                }
            }
        }

        let Some(snapshot) = latest else {
            return false;
        };
        let tiles: Vec<Tile> = snapshot.iter().map(Tile::from_item).collect();
        let changed = tiles != self.tiles;
        self.tiles = tiles;
        changed
    }

    /// Tiles in ascending creation order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Newest item, the tile the strip scrolls to when it appears.
    pub fn scroll_anchor(&self) -> Option<ItemId> {
        self.tiles.last().map(|tile| tile.id)
    }

    /// Creates one empty item and saves it.
    ///
    /// # Errors
    /// On failure the new item is dropped again and the error is returned.
    pub fn add(&mut self, store: &mut StoreController) -> Result<ItemId, PersistenceError> {
        let checkpoint = store.checkpoint();
        let id = store.create_item();
        if let Err(err) = store.save() {
            store.restore(checkpoint);
            return Err(err);
        }
        self.refresh();
        Ok(id)
    }

    /// Opens the editor for one tile.
    pub fn select(
        &self,
        store: &StoreController,
        id: ItemId,
    ) -> Result<EditorView, PersistenceError> {
        EditorView::open(store, id)
    }

    /// Deletes one item and saves.
    ///
    /// # Errors
    /// On failure the item stays in the working context.
    pub fn delete(
        &mut self,
        store: &mut StoreController,
        id: ItemId,
    ) -> Result<(), PersistenceError> {
        let checkpoint = store.checkpoint();
        store.delete(id)?;
        if let Err(err) = store.save() {
            store.restore(checkpoint);
            return Err(err);
        }
        self.refresh();
        Ok(())
    }
}

fn caption_for(note: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(note, " ");
    let trimmed = collapsed.trim();
    let mut caption: String = trimmed.chars().take(CAPTION_MAX_CHARS).collect();
    if trimmed.chars().count() > CAPTION_MAX_CHARS {
        caption.push_str("...");
    }
    caption
}
