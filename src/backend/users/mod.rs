//! User Directory Module
//!
//! Search, lookup, suggestions and profile updates.
//!
//! # Module Structure
//!
//! ```text
//! users/
//! ├── mod.rs      - Module exports
//! ├── service.rs  - Directory operations over the store
//! └── handlers.rs - HTTP handlers
//! ```

pub mod handlers;
pub mod service;

pub use service::ProfileUpdate;
