//! Social Graph Module
//!
//! Follow/unfollow and follower listings.
//!
//! # Module Structure
//!
//! ```text
//! social/
//! ├── mod.rs      - Module exports
//! ├── graph.rs    - Follow edge operations
//! └── handlers.rs - HTTP handlers
//! ```

pub mod graph;
pub mod handlers;
