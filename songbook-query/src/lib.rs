//! # songbook-query
//!
//! The pure core of the songbook catalog: it turns sparse search filters into
//! parameterized SQL, resolves pagination windows, validates field formats
//! and pages lyrics by couplet. It performs no I/O.
//!
//! ## Searching
//!
//! ```rust
//! use songbook_query::{PredicateBuilder, SongFilter, ValidatorRegistry};
//!
//! let validators = ValidatorRegistry::new()?;
//! let filter = SongFilter::from_query_str("group=Muse&text=love&page=2&limit=5")?;
//! validators.validate(&filter)?;
//!
//! let query = PredicateBuilder::sqlite().build(&filter);
//! assert!(query.sql.ends_with("LIMIT 5 OFFSET 5"));
//! assert_eq!(query.params.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Lyrics
//!
//! ```rust
//! use songbook_query::couplets;
//!
//! let page = couplets::paginate("verse one\n\nchorus\n\nverse two", 1, 2)?;
//! assert_eq!(page.couplets, vec!["verse one", "chorus"]);
//! # Ok::<(), songbook_query::QueryError>(())
//! ```
//!
//! ## Boundaries
//!
//! Storage and metadata lookups are traits ([`EntityStore`], [`MetadataProvider`])
//! implemented by the `songbook-sqlite` and `songbook-server` crates.

pub mod couplets;
pub mod descriptor;
pub mod enrichment;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod predicate;
pub mod query;
pub mod sql;
pub mod storage;
pub mod validation;

pub use couplets::{COUPLET_SEPARATOR, CoupletPage};
pub use descriptor::{
    FieldDescriptor, FilterSchema, GROUP_SCHEMA, MatchMode, SONG_SCHEMA, Target, ValidationRule,
};
pub use enrichment::{MetadataProvider, normalize_release_date};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{Column, Filter, FilterValue};
pub use models::{
    AddSongRequest, Group, Song, SongDetails, SongsPage, UpdateSongRequest,
};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_WINDOW, Pagination};
pub use predicate::{BuiltQuery, PredicateBuilder};
pub use query::{GroupFilter, QueryFilter, SongFilter};
pub use sql::{DatabaseType, SqlBuilder};
pub use storage::EntityStore;
pub use validation::{FieldError, ValidationErrors, ValidatorRegistry};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::models::{Group, Song, SongDetails};
    pub use crate::pagination::Pagination;
    pub use crate::predicate::PredicateBuilder;
    pub use crate::query::{GroupFilter, QueryFilter, SongFilter};
    pub use crate::storage::EntityStore;
    pub use crate::validation::ValidatorRegistry;
}
