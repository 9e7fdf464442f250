//! Shared Error Types
//!
//! Input validation failures detected before any store access. The backend
//! maps every variant to `400 Bad Request`.
//!
//! # Usage
//!
//! ```rust
//! use gogo::shared::error::SharedError;
//!
//! let error = SharedError::validation("description", "Description is required");
//! assert_eq!(error.field(), "description");
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A field failed a format or length rule
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// An identifier was not a well-formed UUID
    #[error("Invalid {field}: {value}")]
    MalformedId {
        field: String,
        value: String,
    },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed_id(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedId {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } | Self::MalformedId { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Invalid email format");
        match &error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
            _ => panic!("Expected ValidationError"),
        }
        assert_eq!(error.to_string(), "Invalid email format");
    }

    #[test]
    fn test_malformed_id_display() {
        let error = SharedError::malformed_id("post id", "abc");
        assert_eq!(error.to_string(), "Invalid post id: abc");
        assert_eq!(error.field(), "post id");
    }
}
