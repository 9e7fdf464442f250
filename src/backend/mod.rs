//! Backend Module
//!
//! All server-side code for GoGo: an Axum HTTP server exposing users, the
//! follow graph, posts, comments, feeds, admin moderation and presence.
//!
//! # Architecture
//!
//! Requests flow through the router, the unified auth middleware on
//! protected routes, a thin handler, and a component function that talks to
//! the store. Component functions take `&Store` and return `BackendResult`,
//! so they are tested without HTTP.
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - Router assembly
//! - **`middleware`** - Session and admin-role checks
//! - **`auth`** - Signup, login, sessions, password hashing, admin bootstrap
//! - **`users`** - Directory, search, profile updates
//! - **`social`** - Follow graph
//! - **`content`** - Posts, likes, comments, feeds
//! - **`admin`** - Moderation overrides
//! - **`realtime`** - Presence registry and SSE stream
//! - **`media`** - Image upload validation and storage
//! - **`store`** - PostgreSQL and in-memory persistence
//! - **`extract`** - Request extractors that reject with the envelope
//! - **`error`** - Backend error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - `gogo-server` binary
//! ├── create_admin.rs - `gogo-create-admin` binary
//! ├── extract.rs      - JSON, query and multipart extractors
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── middleware/     - Request middleware
//! ├── auth/           - Authentication
//! ├── users/          - User directory
//! ├── social/         - Follow graph
//! ├── content/        - Posts, comments, feeds
//! ├── admin/          - Admin handlers
//! ├── realtime/       - Presence
//! ├── media/          - Uploads
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Middleware for request processing
pub mod middleware;

/// Authentication and sessions
pub mod auth;

/// User directory and profiles
pub mod users;

/// Follow graph
pub mod social;

/// Posts, comments and feeds
pub mod content;

/// Admin moderation
pub mod admin;

/// Real-time presence
pub mod realtime;

/// Image uploads
pub mod media;

/// Persistence
pub mod store;

/// Request extractors
pub mod extract;

/// Backend error types
pub mod error;

pub use error::{BackendError, BackendResult};
pub use server::{create_app, init_state};
pub use store::Store;
