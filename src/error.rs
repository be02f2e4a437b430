use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// A single field that failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// The primary error type for the application.
///
/// Every handler returns [`AppResult`]; the [`IntoResponse`] impl turns each
/// variant into the JSON error envelope the dashboard expects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more request fields failed validation. Rendered as `{errors: [...]}`.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    /// The request is well-formed but refers to something unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unique-constraint violation (duplicate username or library name).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Login or password re-verification failed.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    /// Missing, malformed, expired or forged bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Authenticated, but lacking the admin claim.
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials(_) | AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::InvalidInput(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg) => json!({ "error": msg }),
            AppError::Database(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Database error: {:?}", e);
                json!({ "error": "Database error" })
            }
            AppError::Internal(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Internal error: {:?}", e);
                json!({ "error": "Something went wrong!" })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(anyhow::anyhow!("blocking task failed: {}", err))
    }
}

/// Returns `true` when the store rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Returns `true` when a write referenced a row that does not exist.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;
