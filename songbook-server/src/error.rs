//! API error types and handling

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use songbook_query::{ErrorCode, QueryError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// A failure from the catalog, storage or metadata layers.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A request the handlers reject before reaching the catalog.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A body that is not the expected JSON.
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Query(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) | ApiError::Json(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_REQUEST => "bad_request",
            _ => "internal_error",
        }
    }

    fn code(&self) -> String {
        match self {
            ApiError::Query(err) => err.code.code(),
            ApiError::BadRequest(_) | ApiError::Json(_) => ErrorCode::InvalidParameter.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Query(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Query(err) => error!(error = %err.display_full(), "Request failed"),
                other => error!(error = %other, "Request failed"),
            }
        }

        let body = Json(json!({
            "error": {
                "type": self.error_type(),
                "code": self.code(),
                "message": self.message(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(QueryError::not_found("Song")).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(QueryError::invalid_input("page", "bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(QueryError::invalid_filter("bad date")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(QueryError::upstream("timeout")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(QueryError::unique_violation("Group", "name")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = ApiError::from(QueryError::not_found("Song")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["type"], "not_found");
        assert_eq!(body["error"]["code"], "S1001");
        assert_eq!(body["error"]["message"], "No Song record found matching the query");
    }
}
