//! Logging bootstrap for songbook binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the process, through [`init`] or [`init_with`].
//!
//! # Environment Variables
//!
//! - `SONGBOOK_DEBUG=true|1|yes` - Enable debug logging
//! - `SONGBOOK_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SONGBOOK_LOG_FORMAT=json|pretty|compact` - Set the output format
//!
//! Environment variables win over the values passed to [`init_with`].
//!
//! ```rust,no_run
//! use songbook_query::logging;
//!
//! // From configuration, once at startup
//! logging::init_with("info", "compact");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SONGBOOK_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SONGBOOK_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn normalize_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn normalize_format(format: &str) -> Option<&'static str> {
    match format.to_lowercase().as_str() {
        "json" => Some("json"),
        "pretty" => Some("pretty"),
        "compact" => Some("compact"),
        _ => None,
    }
}

/// Resolve the log level: `SONGBOOK_LOG_LEVEL`, then `SONGBOOK_DEBUG`, then `fallback`.
pub fn get_log_level(fallback: &str) -> &'static str {
    if let Some(level) = env::var("SONGBOOK_LOG_LEVEL")
        .ok()
        .and_then(|l| normalize_level(&l))
    {
        return level;
    }
    if is_debug_enabled() {
        return "debug";
    }
    normalize_level(fallback).unwrap_or("info")
}

/// Resolve the output format: `SONGBOOK_LOG_FORMAT`, then `fallback`.
pub fn get_log_format(fallback: &str) -> &'static str {
    env::var("SONGBOOK_LOG_FORMAT")
        .ok()
        .and_then(|f| normalize_format(&f))
        .or_else(|| normalize_format(fallback))
        .unwrap_or("pretty")
}

/// Initialize logging from the environment alone.
pub fn init() {
    init_with("info", "pretty");
}

/// Initialize logging with configured defaults. Subsequent calls are no-ops.
pub fn init_with(level: &str, format: &str) {
    let level = get_log_level(level);
    let format = get_log_format(format);

    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "songbook={level},songbook_query={level},songbook_sqlite={level},songbook_server={level},tower_http={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("info"));

            let result = match format {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if result.is_ok() {
                tracing::info!(level = level, format = format, "Songbook logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("DEBUG"), Some("debug"));
        assert_eq!(normalize_level("warning"), Some("warn"));
        assert_eq!(normalize_level("loud"), None);
    }

    #[test]
    fn test_normalize_format() {
        assert_eq!(normalize_format("Json"), Some("json"));
        assert_eq!(normalize_format("yaml"), None);
    }

    #[test]
    fn test_fallbacks_without_env() {
        if env::var_os("SONGBOOK_LOG_LEVEL").is_none() && env::var_os("SONGBOOK_DEBUG").is_none() {
            assert_eq!(get_log_level("warn"), "warn");
            assert_eq!(get_log_level("bogus"), "info");
        }
        if env::var_os("SONGBOOK_LOG_FORMAT").is_none() {
            assert_eq!(get_log_format("compact"), "compact");
            assert_eq!(get_log_format("bogus"), "pretty");
        }
    }
}
