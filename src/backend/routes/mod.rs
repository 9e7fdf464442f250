//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, static files, layers
//! ├── api_routes.rs   - Public and authenticated API routes
//! └── admin_routes.rs - Admin-only routes
//! ```
//!
//! # Route Organization
//!
//! All API routes live under `/api/v1`; admin routes under
//! `/api/v1/admin`. Stored media is served from `/uploads` and `/health`
//! answers liveness probes. Anything else gets a 404 envelope.
//!
//! # Example
//!
//! ```rust,no_run
//! use gogo::backend::routes::create_router;
//! use gogo::backend::server::{config::ServerConfig, state::AppState};
//! use gogo::backend::store::Store;
//!
//! let state = AppState::new(ServerConfig::default(), Store::memory());
//! let router = create_router(state);
//! ```

/// Main router creation
pub mod router;

/// Public and authenticated API routes
pub mod api_routes;

/// Admin-only routes
pub mod admin_routes;

pub use router::create_router;
