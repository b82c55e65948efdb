use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::polish::rewrite::RewriteError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Daily polish quota exhausted")]
    QuotaExhausted,

    #[error("Rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::QuotaExhausted => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUOTA_EXHAUSTED",
                "Today's free polish quota is used up. Upgrade to VIP for unlimited polishing."
                    .to_string(),
            ),
            AppError::Rewrite(e) => {
                tracing::error!("Rewrite error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "REWRITE_FAILED",
                    "The AI polish service is temporarily unavailable. Please try again later."
                        .to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exhausted_maps_to_429() {
        let response = AppError::QuotaExhausted.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_rewrite_failure_maps_to_503() {
        let err = AppError::Rewrite(RewriteError::Unavailable("timeout".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_ownership_errors_keep_their_messages() {
        let err = AppError::Forbidden("You do not own this dream".to_string());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let err = AppError::NotFound("Dream not found".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
