//! GoGo - Social Network Backend
//!
//! GoGo is the server side of a small social network: accounts with
//! cookie or bearer sessions, a follow graph, image posts with likes and
//! comments, a paginated timeline, a random discovery feed, admin
//! moderation and live presence over Server-Sent Events.
//!
//! # Module Structure
//!
//! - **`shared`** - Types a client can deserialize without the server
//!   - Records (`User`, `Post`, `Comment`), views, the response envelope
//!   - Realtime events and validation rules
//!
//! - **`backend`** - The Axum server
//!   - Routes, middleware, component functions
//!   - PostgreSQL or in-memory store
//!
//! # Usage
//!
//! ```rust,no_run
//! use gogo::backend::server::{config::ServerConfig, create_app, init_state};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(init_state(ServerConfig::load()?).await?);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
