//! Authentication test helpers
//!
//! Creates accounts through the public API and returns their bearer tokens.

use axum::http::{Method, StatusCode};
use gogo::backend::auth::{ensure_admin, BootstrapOutcome};
use gogo::backend::server::config::AdminBootstrap;
use serde_json::json;
use uuid::Uuid;

use super::app::TestApp;

pub const TEST_PASSWORD: &str = "password123";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

/// Sign up `username` and log in
pub async fn create_test_user(app: &TestApp, username: &str) -> TestUser {
    let response = app
        .json(
            Method::POST,
            "/api/v1/users/signup",
            None,
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": TEST_PASSWORD,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "signup failed: {}", response.body);

    login(app, username, TEST_PASSWORD).await
}

/// Log in and return the identity with its token
pub async fn login(app: &TestApp, username: &str, password: &str) -> TestUser {
    let response = app
        .json(
            Method::POST,
            "/api/v1/users/login",
            None,
            json!({ "username": username, "password": password }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

    let data = response.data();
    TestUser {
        id: data["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("login returns the user id"),
        username: username.to_string(),
        token: data["token"].as_str().expect("login returns a token").to_string(),
    }
}

/// Bootstrap the admin account directly against the store and log in
pub async fn create_admin(app: &TestApp) -> TestUser {
    let bootstrap = AdminBootstrap {
        username: "admin".to_string(),
        email: "admin@gogo.com".to_string(),
        password: Some(ADMIN_PASSWORD.to_string()),
    };
    let outcome = ensure_admin(&app.state.store, &app.state.passwords, &bootstrap)
        .await
        .expect("bootstrap admin");
    assert!(matches!(outcome, BootstrapOutcome::Created(_)));

    login(app, "admin", ADMIN_PASSWORD).await
}

/// Create a text-only post and return its id
pub async fn create_text_post(app: &TestApp, user: &TestUser, description: &str) -> Uuid {
    let response = app
        .multipart(
            Method::POST,
            "/api/v1/posts",
            Some(&user.token),
            super::app::MultipartBody::new().text("description", description),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "create post failed: {}", response.body);
    response.data()["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("post id")
}
