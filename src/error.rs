use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::users::{dto::FieldError, repo_types::RepoError};

pub const DUPLICATE_ACCOUNT: &str = "There is already an account associated with the given email";
pub const NO_RECORD_FOR_EMAIL: &str = "No record found for given email address";
pub const INCORRECT_PASSWORD: &str = "Incorrect password";

/// Errors surfaced by the HTTP layer. Every variant maps to exactly one status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    #[error("{}", DUPLICATE_ACCOUNT)]
    DuplicateAccount,

    #[error("{}", NO_RECORD_FOR_EMAIL)]
    NotFound,

    #[error("{}", INCORRECT_PASSWORD)]
    PasswordMismatch,

    #[error("internal error: {0}")]
    Internal(#[source] RepoError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation => ApiError::DuplicateAccount,
            err @ (RepoError::Hash(_) | RepoError::Storage(_)) => ApiError::Internal(err),
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![FieldError::new("query", rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": errors }))
            }
            ApiError::DuplicateAccount => {
                tracing::warn!("duplicate account rejected");
                (StatusCode::BAD_REQUEST, json!({ "detail": DUPLICATE_ACCOUNT }))
            }
            ApiError::NotFound => {
                tracing::debug!("no account for email");
                (StatusCode::BAD_REQUEST, json!({ "detail": NO_RECORD_FOR_EMAIL }))
            }
            ApiError::PasswordMismatch => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": INCORRECT_PASSWORD }))
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
