//! HTTP handlers.

pub mod health;
pub mod songs;
pub mod text;

use axum::extract::rejection::PathRejection;

use crate::error::ApiError;

/// Map a malformed `{id}` segment to a 400.
pub(crate) fn bad_id(rejection: PathRejection) -> ApiError {
    ApiError::BadRequest(format!("song id must be an integer: {}", rejection.body_text()))
}
