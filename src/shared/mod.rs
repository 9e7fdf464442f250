//! Shared Module
//!
//! Types that describe the social network independently of the HTTP server:
//! the stored records, the client-facing views built from them, the JSON
//! response envelope, and realtime events. A client crate can depend on
//! these for deserialization without pulling in the backend.
//!
//! # Module Structure
//!
//! ```text
//! shared/
//! ├── mod.rs       - Module exports
//! ├── models.rs    - User, Post, Comment records and joined aggregates
//! ├── views.rs     - Client-facing shapes with absolute media URLs
//! ├── response.rs  - `{status, message, data}` envelope
//! ├── event.rs     - Realtime events (`online-users`)
//! ├── validation.rs - Username, email, password and body rules
//! └── error.rs     - Field validation errors
//! ```

/// Stored records
pub mod models;

/// Client-facing shapes
pub mod views;

/// Response envelope
pub mod response;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Input validation rules
pub mod validation;

/// Re-export commonly used types for convenience
pub use models::{Comment, Post, Role, Toggle, User};
pub use event::{EventType, RealtimeEvent};
pub use error::SharedError;
pub use response::{ApiResponse, ApiStatus};
