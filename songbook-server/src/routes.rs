//! API route definitions

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    handlers::{health, songs, text},
    state::AppState,
};

/// CORS policy: any origin, the verbs the API serves, JSON and auth headers.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/songs", get(songs::search_songs))
        .route("/api/v1/songs/add", post(songs::add_song))
        .route(
            "/api/v1/songs/{id}",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route("/api/v1/songs/{id}/text", get(text::song_text))
}

/// The complete application: routes, access log and CORS, bound to `state`.
pub fn app(state: AppState) -> Router {
    api_routes()
        .layer(middleware::from_fn_with_state(state.clone(), crate::middleware::logging::access_log))
        .layer(cors_layer())
        .with_state(state)
}
