//! Unified error handling for the admin API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::StoreCandidate;
use crate::services::StoreServiceError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The write collided with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Similar stores exist and the client has not confirmed the save.
    #[error("Possible duplicate stores: {}", .0.len())]
    DuplicateConfirmationRequired(Vec<StoreCandidate>),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreServiceError> for AppError {
    fn from(err: StoreServiceError) -> Self {
        match err {
            StoreServiceError::Validation(message) => Self::BadRequest(message),
            StoreServiceError::Stage(e) => Self::BadRequest(e.to_string()),
            StoreServiceError::NotFound(id) => Self::NotFound(format!("store {id}")),
            StoreServiceError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("store".to_string())
            }
            StoreServiceError::Repository(RepositoryError::Conflict(message)) => {
                Self::Conflict(message)
            }
            StoreServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::DuplicateConfirmationRequired(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Internal(_) => json!({"error": "Internal server error"}),
            Self::DuplicateConfirmationRequired(matches) => json!({
                "error": "Possible duplicate stores",
                "matches": matches,
            }),
            other => json!({"error": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use onboarding_core::{StageError, StoreId, StoreStage};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("store abc".to_string());
        assert_eq!(err.to_string(), "Not found: store abc");

        let err = AppError::DuplicateConfirmationRequired(vec![StoreCandidate::new(
            "1",
            "Corner Cafe",
            "Gauteng",
        )]);
        assert_eq!(err.to_string(), "Possible duplicate stores: 1");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::DuplicateConfirmationRequired(Vec::new())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_to_client_errors() {
        let stage = StoreServiceError::Stage(StageError::InvalidTransition {
            from: StoreStage::Lead,
            to: StoreStage::Rollout,
        });
        assert!(matches!(AppError::from(stage), AppError::BadRequest(_)));

        let missing = StoreServiceError::NotFound(StoreId::new("abc"));
        assert!(matches!(AppError::from(missing), AppError::NotFound(_)));

        let corrupt = StoreServiceError::Repository(RepositoryError::DataCorruption("x".into()));
        assert!(matches!(AppError::from(corrupt), AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_repository_conflict_is_409() {
        let conflict = StoreServiceError::Repository(RepositoryError::Conflict(
            "store abc already exists".to_string(),
        ));
        let response = AppError::from(conflict).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Conflict: store abc already exists");
        assert!(body.get("matches").is_none());
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("connection string leaked".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("leaked"));
    }
}
