//! Article Error Types
//!
//! Article-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::caller::CallerError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use serde_json::json;
use thiserror::Error;

/// Article-specific result type alias
pub type ArticleResult<T> = Result<T, ArticleError>;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Article not found")]
    NotFound,

    #[error("Unauthorized: No session")]
    Unauthenticated,

    #[error("Forbidden: Admins only")]
    Forbidden,

    /// Request body failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// Upload request carried no `image` file
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CallerError> for ArticleError {
    fn from(err: CallerError) -> Self {
        match err {
            CallerError::Anonymous => ArticleError::Unauthenticated,
            CallerError::NotPrivileged => ArticleError::Forbidden,
        }
    }
}

impl ArticleError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ArticleError::NotFound => StatusCode::NOT_FOUND,
            ArticleError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ArticleError::Forbidden => StatusCode::FORBIDDEN,
            ArticleError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ArticleError::MissingFile | ArticleError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ArticleError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ArticleError::Database(sqlx::Error::PoolTimedOut) => StatusCode::SERVICE_UNAVAILABLE,
            ArticleError::Database(_) | ArticleError::Storage(_) | ArticleError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArticleError::NotFound => ErrorKind::NotFound,
            ArticleError::Unauthenticated => ErrorKind::Unauthorized,
            ArticleError::Forbidden => ErrorKind::Forbidden,
            ArticleError::InvalidInput(_) => ErrorKind::UnprocessableEntity,
            ArticleError::MissingFile | ArticleError::InvalidUpload(_) => ErrorKind::BadRequest,
            ArticleError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            ArticleError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            ArticleError::Database(_) | ArticleError::Storage(_) | ArticleError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server errors keep their detail out of the body.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            AppError::new(self.kind(), self.kind().as_str())
        } else {
            AppError::new(self.kind(), self.to_string())
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ArticleError::Database(e) => {
                tracing::error!(error = %e, "Article database error");
            }
            ArticleError::Storage(e) => {
                tracing::error!(error = %e, "Upload storage error");
            }
            ArticleError::Internal(msg) => {
                tracing::error!(message = %msg, "Article internal error");
            }
            ArticleError::Forbidden => {
                tracing::warn!("Privileged article operation refused");
            }
            _ => {
                tracing::debug!(error = %self, "Article error");
            }
        }
    }
}

impl IntoResponse for ArticleError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            // Shape the editor's image tool expects
            ArticleError::MissingFile => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": 0, "file": null })),
            )
                .into_response(),
            _ => self.to_app_error().into_response(),
        }
    }
}
