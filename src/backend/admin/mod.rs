//! Admin Override Module
//!
//! Role-gated moderation routes. Access control lives in
//! `middleware::admin`; the handlers reuse the regular operations without
//! ownership checks.

pub mod handlers;
