//! Core of NoteStrip: a strip of notes over a local SQLite item store.
//!
//! Rendering lives outside this crate. Renderers drive [`BrowseView`] and
//! [`EditorView`], which in turn drive the [`StoreController`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod view;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use store::{
    Clock, ContextCheckpoint, PendingChanges, PersistenceError, SaveSummary, StoreController,
    SystemClock, WorkingContext,
};
pub use view::browse::{BrowseView, Tile};
pub use view::editor::EditorView;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
