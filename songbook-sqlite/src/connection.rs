//! SQLite connection wrapper.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rusqlite::types::Value;
use tokio::sync::OwnedSemaphorePermit;
use tokio_rusqlite::Connection;
use tracing::{debug, trace};

use crate::error::{SqliteError, SqliteResult};
use crate::row::FromSqliteRow;

/// An idle connection waiting in the pool.
pub(crate) struct PooledConnection {
    /// The underlying connection.
    pub conn: Connection,
    /// When this connection was created.
    pub created_at: Instant,
    /// When this connection was last used.
    pub last_used: Instant,
}

impl PooledConnection {
    pub fn new(conn: Connection) -> Self {
        let now = Instant::now();
        Self {
            conn,
            created_at: now,
            last_used: now,
        }
    }
}

pub(crate) type IdleQueue = Arc<Mutex<VecDeque<PooledConnection>>>;

/// A connection checked out of a [`SqlitePool`](crate::SqlitePool).
///
/// Holds a pool permit for its lifetime; file-backed connections go back to
/// the idle queue on drop.
pub struct SqliteConnection {
    conn: Option<Connection>,
    _permit: OwnedSemaphorePermit,
    return_to_pool: Option<IdleQueue>,
    created_at: Instant,
}

impl SqliteConnection {
    pub(crate) fn new_pooled(
        conn: Connection,
        permit: OwnedSemaphorePermit,
        return_to_pool: Option<IdleQueue>,
        created_at: Instant,
    ) -> Self {
        Self {
            conn: Some(conn),
            _permit: permit,
            return_to_pool,
            created_at,
        }
    }

    fn conn(&self) -> SqliteResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| SqliteError::connection("connection already returned to the pool"))
    }

    /// Run `f` on the connection's worker thread.
    pub async fn call<F, R>(&self, f: F) -> SqliteResult<R>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.conn()?
            .call(move |conn| f(conn).map_err(tokio_rusqlite::Error::from))
            .await
            .map_err(SqliteError::from)
    }

    /// Run a parameterized query and decode every row.
    pub async fn query_params<T>(&self, sql: &str, params: Vec<Value>) -> SqliteResult<Vec<T>>
    where
        T: FromSqliteRow + Send + 'static,
    {
        let sql = sql.to_string();
        debug!(sql = %sql, params = params.len(), "Executing parameterized query");

        self.call(move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), T::from_row)?;
            rows.collect()
        })
        .await
    }

    /// Run a parameterized query and decode the first row, if any.
    pub async fn query_optional<T>(&self, sql: &str, params: Vec<Value>) -> SqliteResult<Option<T>>
    where
        T: FromSqliteRow + Send + 'static,
    {
        let sql = sql.to_string();
        debug!(sql = %sql, params = params.len(), "Executing query_optional");

        self.call(move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
            let first = match rows.next()? {
                Some(row) => Some(T::from_row(row)?),
                None => None,
            };
            Ok(first)
        })
        .await
    }

    /// Execute a statement with parameters and return the number of affected rows.
    pub async fn execute_params(&self, sql: &str, params: Vec<Value>) -> SqliteResult<usize> {
        let sql = sql.to_string();
        debug!(sql = %sql, params = params.len(), "Executing parameterized statement");

        self.call(move |conn| {
            conn.execute(&sql, rusqlite::params_from_iter(params.iter()))
        })
        .await
    }

    /// Execute an insert with parameters and return the new rowid.
    pub async fn execute_insert_params(&self, sql: &str, params: Vec<Value>) -> SqliteResult<i64> {
        let sql = sql.to_string();
        debug!(sql = %sql, params = params.len(), "Executing parameterized insert");

        self.call(move |conn| {
            conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Execute multiple statements in a batch.
    pub async fn execute_batch(&self, sql: &str) -> SqliteResult<()> {
        let sql = sql.to_string();
        debug!(sql = %sql, "Executing batch");

        self.call(move |conn| conn.execute_batch(&sql)).await
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if let (Some(pool), Some(conn)) = (self.return_to_pool.take(), self.conn.take()) {
            trace!("Returning connection to pool");
            pool.lock().push_back(PooledConnection {
                conn,
                created_at: self.created_at,
                last_used: Instant::now(),
            });
        }
    }
}
