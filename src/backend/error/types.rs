/**
 * Backend Error Types
 *
 * This module defines the error type returned by every component operation
 * and HTTP handler. Each variant maps to one HTTP status.
 *
 * # Error Categories
 *
 * | Variant            | Status |
 * |--------------------|--------|
 * | `InvalidArgument`  | 400    |
 * | `InvalidOperation` | 400    |
 * | `Unauthorized`     | 401    |
 * | `Forbidden`        | 403    |
 * | `NotFound`         | 404    |
 * | `Conflict`         | 409    |
 * | `Internal`         | 500    |
 *
 * Store and media failures are wrapped and classified: a unique violation
 * becomes a conflict, an unsupported upload a bad request, and anything else
 * an internal error whose detail is logged but never sent to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::media::MediaError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use gogo::backend::error::BackendError;
///
/// let err = BackendError::not_found("Post not found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed identifier, missing field, or rejected input
    #[error("{0}")]
    InvalidArgument(String),

    /// Well-formed request for an operation that is not allowed on its
    /// target, e.g. following yourself
    #[error("{0}")]
    InvalidOperation(String),

    /// Missing or invalid credential, or an ownership violation
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl BackendError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidOperation(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(StoreError::UniqueViolation(_)) => StatusCode::CONFLICT,
            Self::Media(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Store(_) | Self::Media(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the client
    pub fn message(&self) -> String {
        match self {
            Self::InvalidArgument(message)
            | Self::InvalidOperation(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => message.clone(),
            Self::Validation(err) => err.to_string(),
            Self::Store(StoreError::UniqueViolation(_)) => "Username already exists".to_string(),
            Self::Media(err) if err.is_client_error() => err.to_string(),
            Self::Internal(_) | Self::Store(_) | Self::Media(_) => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<bcrypt::BcryptError> for BackendError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("password hashing failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("token signing failed: {}", err))
    }
}
