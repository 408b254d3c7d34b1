//! SQLite storage for the songbook catalog.
//!
//! Built on `tokio-rusqlite`, so every statement runs on a dedicated thread
//! without blocking the async runtime.
//!
//! ```rust
//! use songbook_query::{EntityStore, Group};
//! use songbook_sqlite::{GroupStore, SqlitePool, migrate};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePool::connect("sqlite::memory:").await?;
//! migrate(&pool).await?;
//!
//! let groups = GroupStore::new(pool);
//! let id = groups.create(&Group::new("Muse")).await?;
//! assert_eq!(groups.get(id).await?.name, "Muse");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod migrate;
pub mod pool;
pub mod row;
pub mod store;
pub mod types;

pub use config::{DatabasePath, JournalMode, SqliteConfig, SynchronousMode};
pub use connection::SqliteConnection;
pub use error::{SqliteError, SqliteResult};
pub use migrate::{MIGRATIONS, Migration, MigrationRecord, MigrationReport, migrate};
pub use pool::{PoolConfig, PoolStats, SqlitePool, SqlitePoolBuilder};
pub use row::FromSqliteRow;
pub use store::{GroupStore, SongStore};
