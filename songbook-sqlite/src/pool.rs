//! Connection pool for SQLite.
//!
//! File databases reuse idle connections. An in-memory database exists only
//! inside the connection that opened it, so the pool opens it once and hands
//! every caller a handle to that same connection.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio_rusqlite::Connection;
use tracing::{debug, info, trace, warn};

use crate::config::SqliteConfig;
use crate::connection::{IdleQueue, PooledConnection, SqliteConnection};
use crate::error::{SqliteError, SqliteResult};

/// A connection pool for SQLite.
///
/// ```rust,no_run
/// use songbook_sqlite::{SqliteConfig, SqlitePool};
///
/// # async fn run() -> songbook_sqlite::SqliteResult<()> {
/// let pool = SqlitePool::new(SqliteConfig::file("songs.db")).await?;
/// let conn = pool.get().await?;
/// conn.execute_batch("SELECT 1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqlitePool {
    config: Arc<SqliteConfig>,
    semaphore: Arc<Semaphore>,
    idle_connections: IdleQueue,
    /// The single connection backing an in-memory database.
    shared: Option<(Connection, Instant)>,
    pool_config: Arc<PoolConfig>,
    stats: Arc<Mutex<PoolStats>>,
}

/// Statistics about pool usage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of connection reuses.
    pub reuses: u64,
    /// Number of new connections opened.
    pub opens: u64,
    /// Number of connections closed due to expiration.
    pub expirations: u64,
    /// Number of connections currently checked out.
    pub in_use: usize,
}

impl SqlitePool {
    /// Create a new connection pool from configuration.
    pub async fn new(config: SqliteConfig) -> SqliteResult<Self> {
        Self::with_pool_config(config, PoolConfig::default()).await
    }

    /// Create a new connection pool with custom pool configuration.
    pub async fn with_pool_config(config: SqliteConfig, pool_config: PoolConfig) -> SqliteResult<Self> {
        if pool_config.max_connections == 0 {
            return Err(SqliteError::config("max_connections must be at least 1"));
        }

        // Opening one connection up front surfaces bad paths immediately.
        let first = Self::open_connection(&config).await?;
        let mut stats = PoolStats {
            opens: 1,
            ..Default::default()
        };

        let idle = VecDeque::with_capacity(pool_config.max_connections);
        let (shared, idle) = if config.path.is_memory() {
            (Some((first, Instant::now())), idle)
        } else {
            let mut idle = idle;
            idle.push_back(PooledConnection::new(first));
            for _ in 1..pool_config.min_connections.min(pool_config.max_connections) {
                match Self::open_connection(&config).await {
                    Ok(conn) => {
                        stats.opens += 1;
                        idle.push_back(PooledConnection::new(conn));
                    }
                    Err(e) => warn!(error = %e, "Failed to pre-warm connection"),
                }
            }
            (None, idle)
        };

        info!(
            path = %config.path.display(),
            max_connections = pool_config.max_connections,
            idle = idle.len(),
            "SQLite connection pool created"
        );

        Ok(Self {
            config: Arc::new(config),
            semaphore: Arc::new(Semaphore::new(pool_config.max_connections)),
            idle_connections: Arc::new(Mutex::new(idle)),
            shared,
            pool_config: Arc::new(pool_config),
            stats: Arc::new(Mutex::new(stats)),
        })
    }

    /// Create a pool from a database URL with default pool settings.
    pub async fn connect(url: &str) -> SqliteResult<Self> {
        Self::builder().url(url).build().await
    }

    /// Open a new connection and run the per-connection PRAGMAs.
    async fn open_connection(config: &SqliteConfig) -> SqliteResult<Connection> {
        let init_sql = config.init_sql();

        let conn = match &config.path {
            crate::config::DatabasePath::Memory => Connection::open_in_memory().await?,
            crate::config::DatabasePath::File(path) => Connection::open(path).await?,
        };

        conn.call(move |conn| {
            conn.execute_batch(&init_sql)?;
            Ok(())
        })
        .await?;

        Ok(conn)
    }

    /// Get a connection from the pool.
    ///
    /// Waits up to `connection_timeout` for a free slot.
    pub async fn get(&self) -> SqliteResult<SqliteConnection> {
        trace!("Acquiring connection from pool");

        let acquire = self.semaphore.clone().acquire_owned();
        let permit = match self.pool_config.connection_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire).await.map_err(|_| {
                SqliteError::timeout(format!(
                    "no connection available after {}ms",
                    limit.as_millis()
                ))
            })?,
            None => acquire.await,
        }
        .map_err(|e| SqliteError::pool(format!("failed to acquire permit: {}", e)))?;

        if let Some((conn, created_at)) = &self.shared {
            self.stats.lock().reuses += 1;
            return Ok(SqliteConnection::new_pooled(conn.clone(), permit, None, *created_at));
        }

        if let Some(pooled) = self.take_idle() {
            self.stats.lock().reuses += 1;
            return Ok(SqliteConnection::new_pooled(
                pooled.conn,
                permit,
                Some(self.idle_connections.clone()),
                pooled.created_at,
            ));
        }

        debug!("No idle connections, opening new connection");
        let conn = Self::open_connection(&self.config).await?;
        self.stats.lock().opens += 1;
        Ok(SqliteConnection::new_pooled(
            conn,
            permit,
            Some(self.idle_connections.clone()),
            Instant::now(),
        ))
    }

    /// Pop the first idle connection that has not expired, dropping stale ones.
    fn take_idle(&self) -> Option<PooledConnection> {
        let mut idle = self.idle_connections.lock();
        while let Some(pooled) = idle.pop_front() {
            if self.pool_config.is_expired(&pooled) {
                self.stats.lock().expirations += 1;
                continue;
            }
            return Some(pooled);
        }
        None
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Get the pool settings.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Get pool statistics.
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.stats.lock().clone();
        stats.in_use = self.pool_config.max_connections - self.semaphore.available_permits();
        stats
    }

    /// Check the database answers a trivial query.
    pub async fn is_healthy(&self) -> bool {
        match self.get().await {
            Ok(conn) => conn
                .call(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
                .await
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Get the number of idle connections in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle_connections.lock().len()
    }

    /// Create a builder for configuring the pool.
    pub fn builder() -> SqlitePoolBuilder {
        SqlitePoolBuilder::new()
    }
}

/// Configuration for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of concurrent connections.
    pub max_connections: usize,
    /// Minimum number of connections to keep in the pool.
    pub min_connections: usize,
    /// How long `get` waits for a free slot.
    pub connection_timeout: Option<Duration>,
    /// Maximum idle time before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime of a connection before it's recycled.
    pub max_lifetime: Option<Duration>,
}

impl PoolConfig {
    fn is_expired(&self, pooled: &PooledConnection) -> bool {
        let too_old = self
            .max_lifetime
            .is_some_and(|lifetime| pooled.created_at.elapsed() > lifetime);
        let too_idle = self
            .idle_timeout
            .is_some_and(|timeout| pooled.last_used.elapsed() > timeout);
        too_old || too_idle
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            connection_timeout: Some(Duration::from_secs(30)),
            idle_timeout: Some(Duration::from_secs(300)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

/// Builder for creating a connection pool.
#[derive(Debug, Default)]
pub struct SqlitePoolBuilder {
    config: Option<SqliteConfig>,
    url: Option<String>,
    pool_config: PoolConfig,
}

impl SqlitePoolBuilder {
    /// Create a new pool builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: SqliteConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.pool_config.max_connections = n;
        self
    }

    /// Set the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.pool_config.connection_timeout = Some(timeout);
        self
    }

    /// Set the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_config.idle_timeout = Some(timeout);
        self
    }

    /// Build the connection pool.
    pub async fn build(self) -> SqliteResult<SqlitePool> {
        let config = match (self.config, self.url) {
            (Some(config), _) => config,
            (None, Some(url)) => SqliteConfig::from_url(url)?,
            (None, None) => return Err(SqliteError::config("no database URL or config provided")),
        };

        SqlitePool::with_pool_config(config, self.pool_config).await
    }
}
