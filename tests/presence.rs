//! Presence over Server-Sent Events through the full router

mod common;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use common::*;
use futures_util::StreamExt;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_presence_stream_registers_and_unregisters() {
    let app = TestApp::new().await;
    let alice = create_test_user(&app, "alice").await;

    let response = app
        .router
        .clone()
        .oneshot(
            request(Method::GET, "/api/v1/realtime/presence", Some(&alice.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(app.state.presence.online_users(), vec![alice.id]);

    let mut body = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("first event arrives")
        .expect("stream open")
        .expect("frame");
    let text = String::from_utf8_lossy(&frame).into_owned();
    assert_contains!(text, "event: online-users");
    assert_contains!(text, alice.id.to_string().as_str());

    drop(body);
    assert!(app.state.presence.online_users().is_empty());
}

#[tokio::test]
async fn test_presence_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/realtime/presence", None).await;

    assert_failure(&response, StatusCode::UNAUTHORIZED, "Unauthorized - No token provided");
}
