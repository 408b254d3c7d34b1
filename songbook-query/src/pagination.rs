//! Offset pagination.
//!
//! [`resolve`] turns a 1-based page and a page size into a concrete
//! `(limit, offset)` window; [`Pagination`] renders that window as SQL.
//!
//! ```rust
//! use songbook_query::pagination::{resolve, Pagination, DEFAULT_PAGE_SIZE};
//!
//! // A zero limit falls back to the default page size
//! assert_eq!(resolve(1, 0), (DEFAULT_PAGE_SIZE, 0));
//! assert_eq!(resolve(3, 25), (25, 50));
//!
//! let page_3 = Pagination::page(3, 25);
//! assert_eq!(page_3.to_sql(), "LIMIT 25 OFFSET 50");
//! ```
//!
//! # Page zero
//!
//! Song search and couplet listing disagree on what page zero means, and both
//! behaviours are kept:
//!
//! - song search: an absent or zero page disables pagination entirely
//!   ([`Pagination::for_search`] returns `None`);
//! - couplets: an absent or zero page is page 1.
//!
//! [`resolve`] itself treats page zero as page 1 for the offset computation.

use std::fmt::Write;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest limit or offset a SQL window can carry (SQLite integers are `i64`).
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Derive `(effective_limit, offset)` from a 1-based page and a page size.
///
/// A zero `limit` becomes [`DEFAULT_PAGE_SIZE`]; a zero `page` is page 1.
/// Both results are capped at [`MAX_WINDOW`].
pub fn resolve(page: u64, limit: u64) -> (u64, u64) {
    let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit.min(MAX_WINDOW) };
    let offset = limit.saturating_mul(page.max(1) - 1).min(MAX_WINDOW);
    (limit, offset)
}

/// Pagination configuration for queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Maximum number of records to take.
    pub take: Option<u64>,
}

impl Pagination {
    /// Create a new pagination with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of records to take.
    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    /// 1-based page of `page_size` records, via [`resolve`].
    pub fn page(page: u64, page_size: u64) -> Self {
        let (limit, offset) = resolve(page, page_size);
        Self {
            skip: Some(offset),
            take: Some(limit),
        }
    }

    /// The window for a song search.
    ///
    /// Pagination only applies when `page` is present and non-zero; `limit`
    /// defaults independently.
    pub fn for_search(page: Option<u64>, limit: Option<u64>) -> Option<Self> {
        match page {
            Some(page) if page != 0 => Some(Self::page(page, limit.unwrap_or(0))),
            _ => None,
        }
    }

    /// Check if pagination is specified.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Generate SQL LIMIT/OFFSET clause.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(48);
        self.write_sql(&mut sql);
        sql
    }

    /// Write the LIMIT/OFFSET clause directly to a buffer.
    ///
    /// SQLite rejects `OFFSET` without `LIMIT`, so a skip on its own is
    /// written with `LIMIT -1`. Values are capped at [`MAX_WINDOW`].
    pub fn write_sql(&self, buffer: &mut String) {
        let take = self.take.map(|t| t.min(MAX_WINDOW));
        let skip = self.skip.map(|s| s.min(MAX_WINDOW));
        match (take, skip) {
            (Some(take), Some(skip)) => {
                let _ = write!(buffer, "LIMIT {} OFFSET {}", take, skip);
            }
            (Some(take), None) => {
                let _ = write!(buffer, "LIMIT {}", take);
            }
            (None, Some(skip)) => {
                let _ = write!(buffer, "LIMIT -1 OFFSET {}", skip);
            }
            (None, None) => {}
        }
    }
}
