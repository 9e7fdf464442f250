//! Backend Error Module
//!
//! This module defines the error type shared by component operations and
//! HTTP handlers, and its conversion into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - `BackendError` and its status mapping
//! └── conversion.rs - `IntoResponse` and extractor rejection conversions
//! ```
//!
//! # HTTP Response Conversion
//!
//! `BackendError` implements `IntoResponse`, so handlers return
//! `Result<_, BackendError>` and failures leave as
//! `{"status": "failure", "message": ...}` with the mapped status code.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;

/// Result alias used by component operations
pub type BackendResult<T> = Result<T, BackendError>;
