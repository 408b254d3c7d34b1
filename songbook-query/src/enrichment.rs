//! Metadata lookup for new songs.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{QueryError, QueryResult};
use crate::models::SongDetails;

/// Date format used by the metadata service and in search filters.
pub const DOTTED_DATE_FORMAT: &str = "%d.%m.%Y";

/// Date format stored in the database.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Looks up release date, lyrics and link for a `(song, group)` pair.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch details for `song` by `group`.
    async fn song_details(&self, song: &str, group: &str) -> QueryResult<SongDetails>;
}

/// Parse a `DD.MM.YYYY` date and re-format it as `YYYY-MM-DD`.
///
/// Unlike search filters this is a real calendar parse: the result is written
/// to storage.
///
/// ```rust
/// use songbook_query::enrichment::normalize_release_date;
///
/// assert_eq!(normalize_release_date("16.07.2006").unwrap(), "2006-07-16");
/// assert!(normalize_release_date("32.13.2020").is_err());
/// ```
pub fn normalize_release_date(value: &str) -> QueryResult<String> {
    let date = NaiveDate::parse_from_str(value.trim(), DOTTED_DATE_FORMAT).map_err(|e| {
        QueryError::upstream(format!("release date {:?} is not DD.MM.YYYY", value))
            .with_field("releaseDate")
            .with_source(e)
    })?;
    Ok(date.format(STORED_DATE_FORMAT).to_string())
}
