/**
 * Real-time Event System
 *
 * Events pushed to connected clients over the realtime channel. Presence is
 * the only producer today: every connect and disconnect emits an
 * `online-users` event whose payload is the full list of connected user ids.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    /// Current set of connected users
    #[serde(rename = "online-users")]
    OnlineUsers,
}

impl EventType {
    /// SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OnlineUsers => "online-users",
        }
    }
}

/// Real-time event that can be broadcast to all subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an `online-users` event carrying the connected user ids
    pub fn online_users(users: &[Uuid]) -> Self {
        Self::new(EventType::OnlineUsers, serde_json::json!(users))
    }

    /// Decode the user ids of an `online-users` payload
    pub fn user_ids(&self) -> Vec<Uuid> {
        serde_json::from_value(self.payload.clone()).unwrap_or_default()
    }
}
