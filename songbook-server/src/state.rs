//! Shared application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::SongCatalog;

/// State handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Catalog operations.
    pub catalog: Arc<SongCatalog>,
    /// Requests slower than this are logged as warnings.
    pub slow_request_threshold: Duration,
    start_time: Instant,
}

impl AppState {
    /// Wrap a catalog with the given slow-request threshold.
    pub fn new(catalog: SongCatalog, slow_request_threshold: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            slow_request_threshold,
            start_time: Instant::now(),
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
