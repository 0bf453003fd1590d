//! Store controller: owns the SQLite connection, the working context and
//! the snapshot subscribers.
//!
//! # Invariants
//! - `save()` applies all staged changes in one transaction or none of them.
//! - The working context is only replaced after a commit succeeded.
//! - Subscribers only ever see committed state.

use super::clock::{Clock, SystemClock};
use super::context::{ContextCheckpoint, PendingChanges, WorkingContext};
use super::error::PersistenceError;
use crate::db::{open_db, open_db_in_memory};
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoResult, SqliteItemRepository};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Counts of changes written by one successful save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub inserted: usize,
    pub edited: usize,
    pub deleted: usize,
}

impl SaveSummary {
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.edited == 0 && self.deleted == 0
    }

    fn of(pending: &PendingChanges) -> Self {
        Self {
            inserted: pending.inserted.len(),
            edited: pending.edited.len(),
            deleted: pending.deleted.len(),
        }
    }
}

/// Owner of one item store.
///
/// Views never hold items; they hold `ItemId` keys and go through this
/// controller for every read and write of the working context.
pub struct StoreController {
    conn: Mutex<Connection>,
    context: WorkingContext,
    subscribers: Vec<Sender<Vec<Item>>>,
    clock: Box<dyn Clock>,
}

impl StoreController {
    /// Opens the store file at `path`, creating it on first use.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Opens an in-memory store already holding `count` saved items.
    pub fn open_preview(count: usize) -> Result<Self, PersistenceError> {
        let mut store = Self::open_in_memory()?;
        for _ in 0..count {
            store.create_item();
        }
        store.save()?;
        Ok(store)
    }

    fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        let committed = SqliteItemRepository::new(&conn)
            .list_items()
            .map_err(PersistenceError::ReadFailed)?;
        info!(
            "event=store_open module=store status=ok item_count={}",
            committed.len()
        );

        Ok(Self {
            conn: Mutex::new(conn),
            context: WorkingContext::from_committed(committed),
            subscribers: Vec::new(),
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the timestamp source used by `create_item`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Returns committed items in strip order.
    pub fn all_items(&self) -> Result<Vec<Item>, PersistenceError> {
        let conn = self.lock_conn();
        SqliteItemRepository::new(&conn)
            .list_items()
            .map_err(PersistenceError::ReadFailed)
    }

    /// Registers an observer of committed state.
    ///
    /// The receiver gets the current snapshot right away and a new one after
    /// every save that changed something. Dropped receivers are pruned on
    /// the next publish.
    pub fn subscribe(&mut self) -> Result<Receiver<Vec<Item>>, PersistenceError> {
        let snapshot = self.all_items()?;
        let (tx, rx) = mpsc::channel();
        tx.send(snapshot).ok();
        self.subscribers.push(tx);
        Ok(rx)
    }

    /// Stages a new item stamped with the current time.
    pub fn create_item(&mut self) -> ItemId {
        let item = Item::new(self.clock.now_epoch_ms());
        let id = item.id;
        debug!(
            "event=item_create module=store status=staged item_id={id} timestamp={}",
            item.timestamp
        );
        self.context.insert_new(item);
        id
    }

    /// Returns the working copy of one item, staged changes included.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.context.get(id)
    }

    /// Stages a full replacement of one item's note.
    pub fn set_note(&mut self, id: ItemId, text: impl Into<String>) -> Result<(), PersistenceError> {
        if !self.context.set_note(id, text.into()) {
            return Err(PersistenceError::UnknownItem(id));
        }
        debug!("event=item_edit module=store status=staged item_id={id}");
        Ok(())
    }

    /// Marks one item for removal on the next save.
    pub fn delete(&mut self, id: ItemId) -> Result<(), PersistenceError> {
        if !self.context.delete(id) {
            return Err(PersistenceError::UnknownItem(id));
        }
        debug!("event=item_delete module=store status=staged item_id={id}");
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.context.has_changes()
    }

    /// Captures the whole working context.
    pub fn checkpoint(&self) -> ContextCheckpoint {
        self.context.checkpoint()
    }

    /// Reinstates a context captured by `checkpoint`.
    pub fn restore(&mut self, checkpoint: ContextCheckpoint) {
        self.context.restore(checkpoint);
    }

    /// Drops every staged change and reloads committed items.
    pub fn discard_changes(&mut self) -> Result<(), PersistenceError> {
        let committed = self.all_items()?;
        self.context = WorkingContext::from_committed(committed);
        Ok(())
    }

    /// Writes every staged change to durable storage.
    ///
    /// # Errors
    /// On any failure the transaction is rolled back, the working context
    /// keeps its staged changes and no subscriber is notified.
    pub fn save(&mut self) -> Result<SaveSummary, PersistenceError> {
        let pending = self.context.pending();
        if pending.is_empty() {
            return Ok(SaveSummary::default());
        }

        let started_at = Instant::now();
        let summary = SaveSummary::of(&pending);
        let committed = {
            let mut conn = self.lock_conn();
            commit_pending(&mut conn, &pending)
        };

        let committed = match committed {
            Ok(items) => items,
            Err(err) => {
                let err = PersistenceError::from_write(err);
                error!(
                    "event=store_save module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=store_save module=store status=ok duration_ms={} inserted={} edited={} deleted={}",
            started_at.elapsed().as_millis(),
            summary.inserted,
            summary.edited,
            summary.deleted
        );
        self.context = WorkingContext::from_committed(committed.iter().cloned());
        self.publish(committed);
        Ok(summary)
    }

    fn publish(&mut self, snapshot: Vec<Item>) {
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-transaction drops the `Transaction`, which rolls back,
        // so the connection is still consistent after poisoning.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn commit_pending(conn: &mut Connection, pending: &PendingChanges) -> RepoResult<Vec<Item>> {
    let tx = conn.transaction()?;
    let committed = {
        let repo = SqliteItemRepository::new(&tx);
        for item in &pending.inserted {
            repo.insert_item(item)?;
        }
        for (id, note) in &pending.edited {
            repo.update_note(*id, note.as_deref())?;
        }
        for id in &pending.deleted {
            repo.tombstone_item(*id)?;
        }
        repo.list_items()?
    };
    tx.commit()?;
    Ok(committed)
}
