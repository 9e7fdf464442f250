//! Real-time Presence Module
//!
//! Tracks connected users and pushes the online set to every open
//! Server-Sent Events stream.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── presence.rs     - `PresenceRegistry` and event broadcasting
//! └── subscription.rs - SSE subscription handler
//! ```

pub mod presence;
pub mod subscription;

pub use presence::{broadcast_event, PresenceRegistry, RealtimeEventBroadcast};
pub use subscription::presence_subscription;
