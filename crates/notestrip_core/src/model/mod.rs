//! Domain model for the note strip.
//!
//! # Invariants
//! - Every record is identified by a stable `ItemId`.
//! - Deletion is stored as a tombstone, so identities are never reused.

pub mod item;
