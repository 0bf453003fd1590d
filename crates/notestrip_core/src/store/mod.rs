//! Persistent store controller and its working context.
//!
//! # Responsibility
//! - Own the durable item store and the in-memory arena views work against.
//! - Stage creates, edits and deletes until an explicit save.
//! - Publish the committed, ordered item list to subscribers.
//!
//! # Invariants
//! - A failed save leaves durable state and the working context untouched.
//! - Saves against one store never overlap.

mod clock;
mod context;
mod controller;
mod error;

pub use clock::{Clock, SystemClock};
pub use context::{ContextCheckpoint, PendingChanges, WorkingContext};
pub use controller::{SaveSummary, StoreController};
pub use error::PersistenceError;
