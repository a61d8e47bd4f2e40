//! HTTP error handling.
//!
//! Two body shapes reach clients: `{"error": msg}` for lookups and server
//! failures, `{"errors": [msg, ...]}` for rejected input.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{ErrorBody, ErrorsBody};
use crate::db::repository::RepositoryError;
use crate::models::ValidationError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// 404 `{"error"}`
    NotFound(String),
    /// 400 `{"errors"}`
    Validation(Vec<String>),
    /// Mapped by variant, see [`AppError::status`].
    Repository(RepositoryError),
}

impl AppError {
    pub fn restaurant_not_found() -> Self {
        AppError::NotFound("Restaurant not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RepositoryError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(errors) => (status, Json(ErrorsBody { errors })).into_response(),
            AppError::Repository(RepositoryError::ValidationError { message, .. }) => (
                status,
                Json(ErrorsBody {
                    errors: vec![message],
                }),
            )
                .into_response(),
            AppError::Repository(e @ RepositoryError::NotFound { .. }) => (
                status,
                Json(ErrorBody {
                    error: e.message().to_string(),
                }),
            )
                .into_response(),
            AppError::Repository(e) => {
                tracing::error!(error = %e, "repository failure");
                (
                    status,
                    Json(ErrorBody {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
            AppError::NotFound(error) => {
                (status, Json(ErrorBody { error })).into_response()
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(vec![err.to_string()])
    }
}

/// Unparseable or ill-typed JSON bodies are reported like validation errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}
