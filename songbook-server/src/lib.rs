#![warn(missing_docs)]

//! Songbook HTTP service.
//!
//! An axum application over [`SongCatalog`], which combines the SQLite stores
//! from `songbook-sqlite` with an HTTP metadata client.
//!
//! ```rust,no_run
//! use songbook_server::{SongbookConfig, server};
//!
//! # async fn run() -> songbook_query::QueryResult<()> {
//! let config = SongbookConfig::from_toml(r#"
//!     [database]
//!     url = "sqlite::memory:"
//!     [metadata]
//!     url = "http://localhost:8081/info"
//! "#).map_err(|e| songbook_query::QueryError::configuration(e.to_string()))?;
//! server::serve(config).await
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metadata;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use catalog::SongCatalog;
pub use config::SongbookConfig;
pub use error::{ApiError, ApiResult};
pub use metadata::HttpMetadataClient;
pub use routes::app;
pub use state::AppState;
