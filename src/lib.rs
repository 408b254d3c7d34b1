//! # Songbook
//!
//! A song catalog REST service built around a typed filter-to-SQL layer.
//!
//! Songbook provides:
//! - Declarative filter schemas that compile sparse search filters into
//!   parameterized SQL with joins and pagination
//! - Field validation that reports every invalid field at once
//! - Couplet-level paging of song lyrics
//! - SQLite storage with pooled async connections and embedded migrations
//! - An axum HTTP API that enriches new songs from a metadata service
//!
//! ## Quick Start
//!
//! ```rust
//! use songbook::prelude::*;
//!
//! let filter = SongFilter::from_query_str("group=Muse&page=2&limit=5")?;
//! ValidatorRegistry::new()?.validate(&filter)?;
//!
//! let query = PredicateBuilder::sqlite().build(&filter);
//! assert!(query.sql.contains(r#"WHERE g."name" = ?"#));
//! assert!(query.sql.ends_with("LIMIT 5 OFFSET 5"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Filter schemas, predicate building, pagination and validation.
pub mod query {
    pub use songbook_query::*;
}

/// SQLite storage.
pub mod sqlite {
    pub use songbook_sqlite::*;
}

/// HTTP service.
pub mod server {
    pub use songbook_server::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use songbook_query::prelude::*;
    pub use songbook_sqlite::{GroupStore, SongStore, SqliteConfig, SqlitePool, migrate};
}

// Re-export key types at the crate root
pub use songbook_query::{QueryError, QueryResult};
