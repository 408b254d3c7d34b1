//! Paging through lyrics one couplet at a time.
//!
//! Stored lyrics separate couplets with a blank line ([`COUPLET_SEPARATOR`]).

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Delimiter between couplets in stored song text.
pub const COUPLET_SEPARATOR: &str = "\n\n";

/// A window of couplets plus the page and limit actually used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupletPage {
    /// Couplets in this page, in order.
    pub couplets: Vec<String>,
    /// Resolved 1-based page.
    pub page: u64,
    /// Resolved page size.
    pub limit: u64,
}

/// Split lyrics into couplets. Empty text has none.
pub fn split(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(COUPLET_SEPARATOR).collect()
}

/// Slice page `page` of `limit` couplets out of `text`.
///
/// A zero `page` is page 1 and a zero `limit` returns every couplet as one
/// page. Fails with a not-found error once the offset passes the last couplet.
///
/// ```rust
/// use songbook_query::couplets::paginate;
///
/// let page = paginate("A\n\nB", 2, 1).unwrap();
/// assert_eq!(page.couplets, vec!["B"]);
/// assert_eq!((page.page, page.limit), (2, 1));
///
/// assert!(paginate("A\n\nB", 3, 1).unwrap_err().is_not_found());
/// ```
pub fn paginate(text: &str, page: u64, limit: u64) -> QueryResult<CoupletPage> {
    let couplets = split(text);
    let total = couplets.len() as u64;

    let page = page.max(1);
    let limit = if limit == 0 { total } else { limit };
    let offset = limit.saturating_mul(page - 1);

    if offset >= total {
        return Err(QueryError::not_found("Couplet")
            .with_context(format!("page {} of {} couplets at limit {}", page, total, limit)));
    }

    // offset < total, so both bounds fit in usize
    let start = offset as usize;
    let end = offset.saturating_add(limit).min(total) as usize;

    Ok(CoupletPage {
        couplets: couplets[start..end].iter().map(|c| (*c).to_string()).collect(),
        page,
        limit,
    })
}
