//! Auth Error Types
//!
//! SIWE-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
///
/// Every verification failure is a 401 and is never retried by the server:
/// the client has to fetch a fresh nonce and sign again.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Message could not be parsed as an EIP-4361 message
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// No nonce was issued for this session, it was already used,
    /// or the message carries a different one
    #[error("Nonce mismatch: request a new nonce and sign again")]
    NonceMismatch,

    /// `Expiration Time` is in the past
    #[error("Message has expired")]
    Expired,

    /// `Not Before` is in the future
    #[error("Message is not yet valid")]
    NotYetValid,

    /// Signature did not recover to the claimed address
    #[error("Invalid signature")]
    InvalidSignature,

    /// Message domain differs from the configured one
    #[error("Message domain does not match this site")]
    DomainMismatch,

    /// Request body lacks the message
    #[error("Expected prepareMessage object as body.")]
    MissingBody,

    /// Session is anonymous
    #[error("You have to first sign_in")]
    NotSignedIn,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedMessage(_)
            | AuthError::NonceMismatch
            | AuthError::Expired
            | AuthError::NotYetValid
            | AuthError::InvalidSignature
            | AuthError::DomainMismatch
            | AuthError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AuthError::MissingBody => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Database(sqlx::Error::PoolTimedOut) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MalformedMessage(_)
            | AuthError::NonceMismatch
            | AuthError::Expired
            | AuthError::NotYetValid
            | AuthError::InvalidSignature
            | AuthError::DomainMismatch
            | AuthError::NotSignedIn => ErrorKind::Unauthorized,
            AuthError::MissingBody => ErrorKind::UnprocessableEntity,
            AuthError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// True for failures of the verify step (as opposed to plumbing errors)
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedMessage(_)
                | AuthError::NonceMismatch
                | AuthError::Expired
                | AuthError::NotYetValid
                | AuthError::InvalidSignature
                | AuthError::DomainMismatch
        )
    }

    /// Convert to AppError. Server errors keep their detail out of the body.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            return AppError::new(self.kind(), self.kind().as_str());
        }
        let err = AppError::new(self.kind(), self.to_string());
        if self.is_verification_failure() {
            err.with_action("Request a new nonce and sign again")
        } else {
            err
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidSignature | AuthError::NonceMismatch => {
                tracing::warn!(error = %self, "SIWE verification rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
