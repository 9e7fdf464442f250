/**
 * Presence Subscription Handler
 *
 * `GET /api/v1/realtime/presence` (authenticated) opens a Server-Sent Events
 * stream.
 *
 * # Lifecycle
 *
 * 1. The stream subscribes to presence events, then registers the user, so
 *    the first event it sees already includes its own connection
 * 2. Every `online-users` event is forwarded as an SSE event of that name
 * 3. When the client goes away the response body is dropped, and with it a
 *    guard that unregisters this connection
 *
 * Lagged receivers skip ahead; the next event carries the full set anyway.
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: online-users
 * data: {"event_type":"online-users","payload":["..."],"timestamp":"..."}
 * ```
 */

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::backend::middleware::AuthUser;
use crate::backend::realtime::presence::PresenceRegistry;

/// Unregisters its connection when dropped
struct PresenceGuard {
    registry: PresenceRegistry,
    user: Uuid,
    connection: Uuid,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.user, self.connection);
    }
}

pub async fn presence_subscription(
    State(registry): State<PresenceRegistry>,
    AuthUser(user): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("[Presence] Subscription opened by {}", user.username);

    let rx = registry.subscribe();
    let connection = registry.register(user.id);
    let guard = PresenceGuard {
        registry,
        user: user.id,
        connection,
    };

    let stream = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("[Presence] Failed to serialize event: {:?}", e);
                            continue;
                        }
                    };
                    let sse_event = Event::default().event(event.event_type.as_str()).data(data);
                    return Some((Ok(sse_event), (rx, guard)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Presence] Receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::warn!("[Presence] Broadcast channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
