//! Common test utilities and helpers
//!
//! - An in-memory application driven through `tower::ServiceExt::oneshot`
//! - Account helpers (signup, login, admin bootstrap)
//! - Envelope assertions
#![allow(dead_code)]

pub mod app;
pub mod assertions;
pub mod auth_helpers;

pub use app::*;
pub use assertions::*;
pub use auth_helpers::*;
