//! Row decoding for catalog entities.
//!
//! Decoders read columns by position, in the order the entity's schema
//! selects them.

use rusqlite::Row;

use songbook_query::{Group, Song};

/// Trait for converting a SQLite row to a Rust type.
pub trait FromSqliteRow: Sized {
    /// Convert a SQLite row to this type.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// `id, name, releaseDate, text, link, groupId, g.name`.
impl FromSqliteRow for Song {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Song {
            id: row.get(0)?,
            name: row.get(1)?,
            release_date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            link: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            group_id: row.get(5)?,
            group: row.get(6)?,
        })
    }
}

/// `id, name`.
impl FromSqliteRow for Group {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// Single-column scalar results such as `SELECT COUNT(*)`.
impl FromSqliteRow for i64 {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        row.get(0)
    }
}
