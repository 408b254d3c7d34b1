//! HTTP client for the song metadata service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use songbook_query::{MetadataProvider, QueryError, QueryResult, SongDetails};

/// Fetches [`SongDetails`] with `GET {url}?group=..&song=..`.
#[derive(Debug, Clone)]
pub struct HttpMetadataClient {
    client: reqwest::Client,
    url: String,
}

impl HttpMetadataClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> QueryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::configuration("failed to build metadata HTTP client").with_source(e))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The configured endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MetadataProvider for HttpMetadataClient {
    #[instrument(skip(self))]
    async fn song_details(&self, song: &str, group: &str) -> QueryResult<SongDetails> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .map_err(|e| QueryError::upstream("metadata request failed").with_source(e))?;

        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "Metadata service answered");

        let response = response.error_for_status().map_err(|e| {
            QueryError::upstream(format!("metadata service returned {}", status)).with_source(e)
        })?;

        response
            .json::<SongDetails>()
            .await
            .map_err(|e| QueryError::upstream("metadata response is not song details").with_source(e))
    }
}
