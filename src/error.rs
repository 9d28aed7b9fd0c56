/// Unified error types for the Finauth service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AuthError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input, reported back to the caller verbatim
    #[error("{0}")]
    Validation(String),

    /// Duplicate email/mobile/referral candidate
    #[error("{0}")]
    Conflict(String),

    /// Unknown identity or record
    #[error("{0}")]
    NotFound(String),

    /// OTP past its expiry
    #[error("{0}")]
    Expired(String),

    /// Bad secret, unverified channel, blocked account, invalid token
    #[error("{0}")]
    Unauthorized(String),

    /// SMS/email sender failure
    #[error("{0}")]
    Dispatch(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format: the failure half of the tri-part envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub message: String,
}

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AuthError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::Expired(_) | AuthError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Dispatch(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AuthError::Database(_) | AuthError::Io(_) | AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            status: false,
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AuthResult<T> = Result<T, AuthError>;
