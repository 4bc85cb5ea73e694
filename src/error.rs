//! Error handling module
//!
//! `VotingError` is the engine's typed failure; `AppError` wraps it for the
//! HTTP surface together with request-level failures.

use crate::voting::{Identity, Operation, Phase, Role};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure of an engine operation. The session is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VotingError {
    #[error("Unauthorized: caller is not {required}")]
    Unauthorized { required: Role },

    #[error("Already registered: {0}")]
    AlreadyRegistered(Identity),

    #[error("Invalid phase for {operation}: requires {expected}, current phase is {current}")]
    InvalidPhase {
        operation: Operation,
        expected: Phase,
        current: Phase,
    },

    #[error("Proposal description cannot be empty")]
    EmptyProposal,

    #[error("Already voted: {0}")]
    AlreadyVoted(Identity),

    #[error("Proposal {0} not found")]
    NotFound(usize),
}

impl VotingError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            VotingError::Unauthorized { .. } => "UNAUTHORIZED",
            VotingError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            VotingError::InvalidPhase { .. } => "INVALID_PHASE",
            VotingError::EmptyProposal => "EMPTY_PROPOSAL",
            VotingError::AlreadyVoted(_) => "ALREADY_VOTED",
            VotingError::NotFound(_) => "NOT_FOUND",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            VotingError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            VotingError::AlreadyRegistered(_)
            | VotingError::InvalidPhase { .. }
            | VotingError::AlreadyVoted(_) => StatusCode::CONFLICT,
            VotingError::EmptyProposal => StatusCode::BAD_REQUEST,
            VotingError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Voting(#[from] VotingError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Voting(e) => (e.status(), e.code(), e.to_string()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Malformed or mistyped request bodies get the same envelope as every other error
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}
