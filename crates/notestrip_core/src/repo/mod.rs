//! Repository layer over the `items` table.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Report semantic errors (`NotFound`) next to transport errors.
//!
//! # Invariants
//! - Repositories never open or commit transactions; callers own them.

pub mod item_repo;
