use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::nyt::UpstreamError;
use crate::store::StoreError;

/// Application error type that converts to HTTP responses.
///
/// Every failure crossing the handler boundary becomes a structured
/// `{ "error": ... }` JSON body; raw errors never reach the transport layer.
#[derive(Debug)]
pub enum AppError {
    Storage(StoreError),
    Upstream(UpstreamError),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Storage(e) => write!(f, "{e}"),
            AppError::Upstream(e) => write!(f, "{e}"),
            AppError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Storage(e) => {
                tracing::error!(error = %e, "Snapshot store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream fetch failed");
                (StatusCode::BAD_GATEWAY, format!("{e}"))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Storage(e)
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        AppError::Upstream(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode as UpstreamStatus;

    #[test]
    fn test_storage_error_is_500_with_generic_message() {
        let err = AppError::Storage(StoreError::Database(sqlx::Error::PoolClosed));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_error_is_502() {
        let err = AppError::Upstream(UpstreamError::Status(UpstreamStatus::SERVICE_UNAVAILABLE));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_error_is_500() {
        let err = AppError::Internal("secret detail".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
