/**
 * Presence Registry
 *
 * Tracks which users currently hold an open realtime connection and
 * broadcasts the online set whenever it changes.
 *
 * # Connections
 *
 * Each user maps to at most one connection id. Registering again replaces
 * the previous connection, and unregistering only succeeds for the
 * connection that is current, so a stale stream closing after its user
 * reconnected does not mark them offline.
 *
 * # Broadcasting
 *
 * Events go out on a `tokio::sync::broadcast` channel. Every register and
 * every effective unregister sends one `online-users` event carrying the
 * full set. Nothing is queued for subscribers that connect later.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::RealtimeEvent;

/// Real-time event broadcast sender
pub type RealtimeEventBroadcast = broadcast::Sender<RealtimeEvent>;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct PresenceRegistry {
    connections: Arc<Mutex<HashMap<Uuid, Uuid>>>,
    events: RealtimeEventBroadcast,
}

/// Send an event to every subscriber. Returns how many received it.
pub fn broadcast_event(events: &RealtimeEventBroadcast, event: RealtimeEvent) -> usize {
    match events.send(event) {
        Ok(count) => {
            tracing::debug!("[Presence] Event broadcast to {} subscribers", count);
            count
        }
        Err(_) => {
            tracing::debug!("[Presence] No subscribers to receive event");
            0
        }
    }
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Uuid>> {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(connections: &HashMap<Uuid, Uuid>) -> Vec<Uuid> {
        let mut users: Vec<Uuid> = connections.keys().copied().collect();
        users.sort();
        users
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events.subscribe()
    }

    /// Record a new connection for `user`, replacing any previous one.
    /// Returns the connection id to hand back to `unregister`.
    pub fn register(&self, user: Uuid) -> Uuid {
        let connection = Uuid::new_v4();
        let mut connections = self.lock();
        if connections.insert(user, connection).is_some() {
            tracing::debug!("[Presence] User {} reconnected", user);
        } else {
            tracing::debug!("[Presence] User {} connected", user);
        }
        broadcast_event(&self.events, RealtimeEvent::online_users(&Self::snapshot(&connections)));
        connection
    }

    /// Drop `user` if `connection` is still their current connection.
    pub fn unregister(&self, user: Uuid, connection: Uuid) -> bool {
        let mut connections = self.lock();
        if connections.get(&user) != Some(&connection) {
            tracing::debug!("[Presence] Ignoring stale disconnect for user {}", user);
            return false;
        }
        connections.remove(&user);
        tracing::debug!("[Presence] User {} disconnected", user);
        broadcast_event(&self.events, RealtimeEvent::online_users(&Self::snapshot(&connections)));
        true
    }

    /// Connected users, sorted by id
    pub fn online_users(&self) -> Vec<Uuid> {
        Self::snapshot(&self.lock())
    }

    pub fn is_online(&self, user: Uuid) -> bool {
        self.lock().contains_key(&user)
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
