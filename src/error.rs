// Error types for the quiz service and their HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::quiz::status::InvalidTransition;

/// Failures surfaced by quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Referenced game, question or user is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation is not valid in the current state (full lobby, wrong status).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthenticated")]
    Unauthenticated,
    /// No further question can be served.
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

pub type QuizResult<T> = Result<T, QuizError>;

impl QuizError {
    pub(crate) fn game_not_found(game_id: i64) -> Self {
        QuizError::NotFound(format!("game {game_id}"))
    }
}

impl From<InvalidTransition> for QuizError {
    fn from(err: InvalidTransition) -> Self {
        QuizError::Conflict(err.to_string())
    }
}

impl From<AuthError> for QuizError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Storage(e) => QuizError::Storage(e),
            _ => QuizError::Unauthenticated,
        }
    }
}

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            QuizError::Conflict(msg) => AppError::Conflict(msg),
            QuizError::InvalidArgument(msg) => AppError::BadRequest(msg),
            QuizError::Unauthenticated => AppError::Unauthorized("invalid or expired session".into()),
            QuizError::OutOfRange(msg) => AppError::NotFound(msg),
            QuizError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            AuthError::UsernameTaken => AppError::Conflict(err.to_string()),
            AuthError::SessionCollision | AuthError::Hash(_) => AppError::Internal(err.to_string()),
            AuthError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
