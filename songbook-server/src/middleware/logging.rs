//! Access-log middleware

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::state::AppState;

/// Log one line per request and warn when it exceeds the slow threshold.
pub async fn access_log(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    info!(
        method = %method,
        path = %path,
        status,
        remote = %remote,
        elapsed_ms = elapsed.as_millis() as u64,
        "[{}] {} - {}, {} {:?}",
        method,
        path,
        status,
        remote,
        elapsed
    );

    if elapsed > state.slow_request_threshold {
        warn!(
            method = %method,
            path = %path,
            elapsed_ms = elapsed.as_millis() as u64,
            threshold_ms = state.slow_request_threshold.as_millis() as u64,
            "Slow request"
        );
    }

    response
}
