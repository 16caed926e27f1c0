use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Discovery & match errors
/// - E2xxx: Presence & signaling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,
    Conflict,
    UpstreamUnavailable,

    // Discovery & match (E1xxx)
    ProfileNotFound,
    SelfLike,
    InvalidCriteria,

    // Presence & signaling (E2xxx)
    SessionNotFound,
    InvalidCallTransition,
    PeerUnreachable,
    SelfCall,
    NotCallParticipant,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",
            Self::Conflict => "E0005",
            Self::UpstreamUnavailable => "E0006",

            // Discovery & match
            Self::ProfileNotFound => "E1001",
            Self::SelfLike => "E1002",
            Self::InvalidCriteria => "E1003",

            // Presence & signaling
            Self::SessionNotFound => "E2001",
            Self::InvalidCallTransition => "E2002",
            Self::PeerUnreachable => "E2003",
            Self::SelfCall => "E2004",
            Self::NotCallParticipant => "E2005",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest | Self::InvalidCriteria
            | Self::SelfLike | Self::SelfCall => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::SessionNotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::InvalidCallTransition | Self::PeerUnreachable => StatusCode::CONFLICT,
            Self::NotCallParticipant => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The stable error code string this error serializes with.
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Known { code, .. } => code.code(),
            Self::Internal(_) => ErrorCode::InternalError.code(),
            Self::Validation(_) => ErrorCode::ValidationError.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message } => {
                let status = code.status_code();
                if status.is_server_error() {
                    tracing::error!(code = code.code(), "{message}");
                } else {
                    tracing::warn!(code = code.code(), "{message}");
                }
                (status, ApiErrorResponse::new(code.code(), message))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
