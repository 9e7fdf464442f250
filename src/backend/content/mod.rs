//! Content Module
//!
//! Posts, likes, comments and feed composition.
//!
//! # Module Structure
//!
//! ```text
//! content/
//! ├── mod.rs       - Module exports
//! ├── posts.rs     - Create, like, update, delete, lookup
//! ├── comments.rs  - Comment attachment, listing and moderation
//! ├── feed.rs      - Timeline and random feed
//! ├── assemble.rs  - Joins posts and comments with their users
//! └── handlers.rs  - HTTP handlers
//! ```
//!
//! # Consistency
//!
//! Writes that touch two records (post + author, comment + post, the
//! cascading post delete) are single store operations; see `store`.

pub mod assemble;
pub mod comments;
pub mod feed;
pub mod handlers;
pub mod posts;

pub use posts::PostPatch;
