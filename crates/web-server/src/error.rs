use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// The status, the machine-readable code and the message shown to clients.
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            AppError::Database(DbError::NotFound) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "The requested resource does not exist".to_string(),
            ),
            AppError::Database(DbError::Duplicate) => (
                StatusCode::CONFLICT,
                "conflict",
                "This dog has already been rated".to_string(),
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Internal error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = Json(json!({ "error": { "code": code, "message": message } }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_statuses() {
        let (status, code, _) = AppError::from(DbError::NotFound).parts();
        assert_eq!((status, code), (StatusCode::NOT_FOUND, "not_found"));

        let (status, code, _) = AppError::from(DbError::Duplicate).parts();
        assert_eq!((status, code), (StatusCode::CONFLICT, "conflict"));
    }

    #[test]
    fn test_internal_details_are_not_returned() {
        let err = AppError::from(DbError::ConnectionConfigError("secret host".to_string()));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "internal_error");
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_invalid_rating_is_a_validation_error() {
        let err = AppError::from(CoreError::InvalidInput(
            "rating".to_string(),
            "must be a multiple of 0.5".to_string(),
        ));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }
}
