//! Item repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleted rows stay as tombstones (`is_deleted = 1`) so their `id` and
//!   `seq` are never handed out again.
//! - Reads reject malformed persisted rows instead of masking them.
//! - Listing order is `timestamp ASC, seq ASC`.

use crate::db::DbError;
use crate::model::item::{Item, ItemId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT id, timestamp, note FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
}

impl RepoError {
    /// Returns whether the underlying SQLite error is a constraint failure.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for items.
pub trait ItemRepository {
    fn insert_item(&self, item: &Item) -> RepoResult<()>;
    fn update_note(&self, id: ItemId, note: Option<&str>) -> RepoResult<()>;
    fn tombstone_item(&self, id: ItemId) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
///
/// Works on a plain connection or, through deref, on an open transaction.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO items (id, timestamp, note) VALUES (?1, ?2, ?3);",
            params![item.id.to_string(), item.timestamp, item.note.as_deref()],
        )?;
        Ok(())
    }

    fn update_note(&self, id: ItemId, note: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                note = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2 AND is_deleted = 0;",
            params![note, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn tombstone_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1 AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1 AND is_deleted = 0;"))?;
        let raw = stmt
            .query_row([id.to_string()], RawItemRow::from_row)
            .optional()?;
        raw.map(RawItemRow::into_item).transpose()
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} WHERE is_deleted = 0 ORDER BY timestamp ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(RawItemRow::from_row(row)?.into_item()?);
        }

        Ok(items)
    }
}

struct RawItemRow {
    id: String,
    timestamp: i64,
    note: Option<String>,
}

impl RawItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            timestamp: row.get("timestamp")?,
            note: row.get("note")?,
        })
    }

    fn into_item(self) -> RepoResult<Item> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{}` in items.id", self.id))
        })?;
        if id.is_nil() {
            return Err(RepoError::InvalidData("nil uuid in items.id".to_string()));
        }

        Ok(Item {
            id,
            timestamp: self.timestamp,
            note: self.note,
        })
    }
}
