//! Request-scoped filter values.
//!
//! A filter pairs a static [`FilterSchema`] with the values one request
//! supplied. Presence is explicit (`Option`), and an empty string is treated
//! the same as an absent value: it produces no predicate and is not validated.

use serde::{Deserialize, Serialize};

use crate::descriptor::{FilterSchema, GROUP_SCHEMA, SONG_SCHEMA};
use crate::error::{QueryError, QueryResult};
use crate::pagination::MAX_WINDOW;

/// A populated filter the predicate builder and validator can walk.
pub trait QueryFilter {
    /// The static description of this filter's fields.
    fn schema(&self) -> &'static FilterSchema;

    /// The raw value supplied for `field`, if any.
    fn raw_value(&self, field: &str) -> Option<&str>;

    /// The value for `field`, treating blank strings as absent.
    fn value(&self, field: &str) -> Option<&str> {
        self.raw_value(field).filter(|v| !v.trim().is_empty())
    }

    /// Requested page, if the filter paginates.
    fn page(&self) -> Option<u64> {
        None
    }

    /// Requested page size, if the filter paginates.
    fn limit(&self) -> Option<u64> {
        None
    }
}

/// Search criteria for songs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongFilter {
    /// Exact song title.
    #[serde(alias = "song")]
    pub name: Option<String>,
    /// Exact group name.
    pub group: Option<String>,
    /// Exact release date, `DD.MM.YYYY`.
    pub release_date: Option<String>,
    /// Substring of the lyrics.
    pub text: Option<String>,
    /// Exact link.
    pub link: Option<String>,
    /// 1-based page; absent or zero returns every match.
    pub page: Option<u64>,
    /// Page size; absent or zero means the default.
    pub limit: Option<u64>,
}

impl SongFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the song title.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the group name.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the release date (`DD.MM.YYYY`).
    pub fn release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    /// Set the lyrics substring.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the link.
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Set the page.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse a URL query string such as `group=Muse&page=2`.
    ///
    /// Unknown keys are ignored and blank values count as absent. `page` and
    /// `limit` must be non-negative integers.
    ///
    /// ```rust
    /// use songbook_query::SongFilter;
    ///
    /// let filter = SongFilter::from_query_str("group=Muse&text=&page=2&utm=x").unwrap();
    /// assert_eq!(filter.group.as_deref(), Some("Muse"));
    /// assert_eq!(filter.text, None);
    /// assert_eq!(filter.page, Some(2));
    /// ```
    pub fn from_query_str(raw: &str) -> QueryResult<Self> {
        let mut filter = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_ref() {
                "song" | "name" => filter.name = Some(value.into_owned()),
                "group" => filter.group = Some(value.into_owned()),
                "releaseDate" => filter.release_date = Some(value.into_owned()),
                "text" => filter.text = Some(value.into_owned()),
                "link" => filter.link = Some(value.into_owned()),
                "page" => filter.page = Some(parse_count("page", &value)?),
                "limit" => filter.limit = Some(parse_count("limit", &value)?),
                _ => {}
            }
        }
        Ok(filter)
    }
}

/// Parse a non-negative integer query parameter no larger than
/// [`MAX_WINDOW`].
pub fn parse_count(field: &str, value: &str) -> QueryResult<u64> {
    let count = value.trim().parse::<u64>().map_err(|e| {
        QueryError::invalid_input(field, format!("expected a non-negative integer, got {:?}", value))
            .with_source(e)
    })?;
    if count > MAX_WINDOW {
        return Err(QueryError::invalid_input(
            field,
            format!("must be at most {}, got {}", MAX_WINDOW, count),
        ));
    }
    Ok(count)
}

impl QueryFilter for SongFilter {
    fn schema(&self) -> &'static FilterSchema {
        &SONG_SCHEMA
    }

    fn raw_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            "group" => self.group.as_deref(),
            "releaseDate" => self.release_date.as_deref(),
            "text" => self.text.as_deref(),
            "link" => self.link.as_deref(),
            _ => None,
        }
    }

    fn page(&self) -> Option<u64> {
        self.page
    }

    fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// Search criteria for groups: a name substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
    /// Substring of the group name.
    pub name: Option<String>,
}

impl GroupFilter {
    /// Filter groups whose name contains `name`.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl QueryFilter for GroupFilter {
    fn schema(&self) -> &'static FilterSchema {
        &GROUP_SCHEMA
    }

    fn raw_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_sets_fields() {
        let filter = SongFilter::new().group("Muse").text("love").page(1);
        assert_eq!(filter.value("group"), Some("Muse"));
        assert_eq!(filter.value("text"), Some("love"));
        assert_eq!(filter.value("name"), None);
        assert_eq!(QueryFilter::page(&filter), Some(1));
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let filter = SongFilter::new().release_date("");
        assert_eq!(filter.raw_value("releaseDate"), Some(""));
        assert_eq!(filter.value("releaseDate"), None);
    }

    #[test]
    fn test_whitespace_counts_as_absent() {
        let filter = SongFilter::new().group(" ").text("\t");
        assert_eq!(filter.value("group"), None);
        assert_eq!(filter.value("text"), None);
        assert_eq!(GroupFilter::name("  ").value("name"), None);
    }

    #[test]
    fn test_from_query_str_decodes_and_ignores_unknown() {
        let filter =
            SongFilter::from_query_str("song=Supermassive%20Black%20Hole&group=Muse&foo=bar&limit=5")
                .unwrap();
        assert_eq!(
            filter,
            SongFilter {
                name: Some("Supermassive Black Hole".into()),
                group: Some("Muse".into()),
                limit: Some(5),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_from_query_str_blank_values_are_absent() {
        let filter = SongFilter::from_query_str("releaseDate=&page=&group=+").unwrap();
        assert_eq!(filter, SongFilter::default());
    }

    #[test]
    fn test_from_query_str_rejects_bad_page() {
        let err = SongFilter::from_query_str("page=two").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.context.field.as_deref(), Some("page"));

        let err = SongFilter::from_query_str("limit=-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_from_query_str_rejects_counts_beyond_sql_range() {
        let err = SongFilter::from_query_str("page=18446744073709551615").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert!(err.is_client_error());
        assert_eq!(err.context.field.as_deref(), Some("page"));

        let err = SongFilter::from_query_str("limit=9223372036854775808").unwrap_err();
        assert_eq!(err.context.field.as_deref(), Some("limit"));

        let filter = SongFilter::from_query_str("limit=9223372036854775807").unwrap();
        assert_eq!(filter.limit, Some(MAX_WINDOW));
    }

    #[test]
    fn test_explicit_zero_page_is_kept() {
        let filter = SongFilter::from_query_str("page=0").unwrap();
        assert_eq!(filter.page, Some(0));
    }

    #[test]
    fn test_group_filter() {
        let filter = GroupFilter::name("Mu");
        assert_eq!(filter.value("name"), Some("Mu"));
        assert_eq!(filter.schema().model, "Group");
        assert_eq!(QueryFilter::page(&filter), None);
    }
}
