use crate::db::DbError;
use crate::model::item::ItemId;
use crate::repo::item_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure surfaced by the store controller.
///
/// Every variant is recoverable: the caller keeps running and the working
/// context is left as it was before the failing call.
#[derive(Debug)]
pub enum PersistenceError {
    /// The store could not be opened or bootstrapped.
    Unavailable(DbError),
    /// A save could not be written; nothing from it was committed.
    WriteFailed(RepoError),
    /// A save was rejected by a storage constraint; nothing was committed.
    ConstraintViolation(String),
    /// Committed items could not be read back.
    ReadFailed(RepoError),
    /// The key does not name an item in the working context.
    UnknownItem(ItemId),
}

impl PersistenceError {
    pub(crate) fn from_write(err: RepoError) -> Self {
        if err.is_constraint_violation() {
            Self::ConstraintViolation(err.to_string())
        } else {
            Self::WriteFailed(err)
        }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "store_unavailable",
            Self::WriteFailed(_) => "write_failed",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::ReadFailed(_) => "read_failed",
            Self::UnknownItem(_) => "unknown_item",
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "item store unavailable: {err}"),
            Self::WriteFailed(err) => write!(f, "failed to save items: {err}"),
            Self::ConstraintViolation(message) => {
                write!(f, "save rejected by item store: {message}")
            }
            Self::ReadFailed(err) => write!(f, "failed to read items: {err}"),
            Self::UnknownItem(id) => write!(f, "unknown item: {id}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::WriteFailed(err) | Self::ReadFailed(err) => Some(err),
            Self::ConstraintViolation(_) | Self::UnknownItem(_) => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}
