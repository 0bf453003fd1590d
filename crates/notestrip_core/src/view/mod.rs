//! View models behind the strip and editor screens.
//!
//! # Responsibility
//! - Turn committed item snapshots into renderable tiles.
//! - Translate renderer commands (`add`, `select`, `save`, `delete`) into
//!   store controller calls.
//!
//! # Invariants
//! - A failed command leaves the working context as it was before the
//!   command and hands the error back to the renderer.
//! - Views hold `ItemId` keys, never item records.

pub mod browse;
pub mod editor;
