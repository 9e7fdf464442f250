//! Middleware Module
//!
//! This module contains the HTTP middleware applied in front of handlers.
//!
//! # Architecture
//!
//! - **`auth`** - Session verification for protected routes
//! - **`admin`** - Role gate for the admin routes, layered after `auth`

pub mod admin;
pub mod auth;

pub use admin::admin_middleware;
pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
