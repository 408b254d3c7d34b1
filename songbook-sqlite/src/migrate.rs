//! Embedded schema migrations.
//!
//! Migrations run in order, each inside its own transaction, and are recorded
//! in `_songbook_migrations` so a second run applies nothing.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{SqliteError, SqliteResult};
use crate::pool::SqlitePool;

/// Name of the migration history table.
pub const HISTORY_TABLE: &str = "_songbook_migrations";

const INIT_HISTORY_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "_songbook_migrations" (
    id TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#;

/// One schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Sortable identifier.
    pub id: &'static str,
    /// What the migration does.
    pub description: &'static str,
    /// Statements to run.
    pub sql: &'static str,
}

/// The catalog schema, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "0001_create_groups",
        description: "create groups",
        sql: r#"
CREATE TABLE IF NOT EXISTS "groups" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" TEXT NOT NULL UNIQUE
);
"#,
    },
    Migration {
        id: "0002_create_songs",
        description: "create songs",
        sql: r#"
CREATE TABLE IF NOT EXISTS "songs" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "groupId" INTEGER NOT NULL REFERENCES "groups" ("id") ON DELETE CASCADE,
    "name" TEXT NOT NULL,
    "releaseDate" TEXT,
    "text" TEXT,
    "link" TEXT
);
CREATE INDEX IF NOT EXISTS "songs_groupId_idx" ON "songs" ("groupId");
"#,
    },
];

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// Migration id.
    pub id: String,
    /// Migration description.
    pub description: String,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
}

/// Outcome of a [`migrate`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Ids applied by this run.
    pub applied: Vec<String>,
    /// Ids that were already recorded.
    pub skipped: Vec<String>,
}

impl MigrationReport {
    /// Whether this run changed the schema.
    pub fn has_changes(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply every pending migration in [`MIGRATIONS`].
pub async fn migrate(pool: &SqlitePool) -> SqliteResult<MigrationReport> {
    run(pool, MIGRATIONS).await
}

/// Apply pending migrations from `migrations`, in order.
#[instrument(skip_all, fields(count = migrations.len()))]
pub async fn run(pool: &SqlitePool, migrations: &'static [Migration]) -> SqliteResult<MigrationReport> {
    let conn = pool.get().await?;
    conn.execute_batch(INIT_HISTORY_SQL).await?;

    let mut report = MigrationReport::default();
    for migration in migrations {
        let applied_at = Utc::now().to_rfc3339();
        let applied = conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let already: i64 = tx.query_row(
                    r#"SELECT COUNT(*) FROM "_songbook_migrations" WHERE id = ?1"#,
                    [migration.id],
                    |row| row.get(0),
                )?;
                if already > 0 {
                    return Ok(false);
                }
                tx.execute_batch(migration.sql)?;
                tx.execute(
                    r#"INSERT INTO "_songbook_migrations" (id, description, applied_at) VALUES (?1, ?2, ?3)"#,
                    (migration.id, migration.description, &applied_at),
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(|e| SqliteError::migration(format!("{}: {}", migration.id, e)))?;

        if applied {
            info!(id = migration.id, description = migration.description, "Applied migration");
            report.applied.push(migration.id.to_string());
        } else {
            report.skipped.push(migration.id.to_string());
        }
    }

    Ok(report)
}

/// Every recorded migration, oldest first.
pub async fn history(pool: &SqlitePool) -> SqliteResult<Vec<MigrationRecord>> {
    let conn = pool.get().await?;
    conn.execute_batch(INIT_HISTORY_SQL).await?;

    let rows = conn
        .call(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT id, description, applied_at FROM "_songbook_migrations" ORDER BY id"#,
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await?;

    rows.into_iter()
        .map(|(id, description, applied_at)| {
            let applied_at = DateTime::parse_from_rfc3339(&applied_at)
                .map_err(|e| SqliteError::migration(format!("{}: bad applied_at: {}", id, e)))?
                .with_timezone(&Utc);
            Ok(MigrationRecord {
                id,
                description,
                applied_at,
            })
        })
        .collect()
}
