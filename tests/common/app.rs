//! In-memory application harness
//!
//! Every `TestApp` owns a fresh memory store and a temporary upload
//! directory, so tests never share state.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use gogo::backend::server::{config::ServerConfig, create_app, state::AppState};
use gogo::backend::store::Store;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const MULTIPART_BOUNDARY: &str = "gogo-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> Option<&str> {
        self.body["message"].as_str()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build an app after letting the caller adjust the test config
    pub async fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("create upload dir");
        let mut config = ServerConfig {
            jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            bcrypt_cost: 4,
            upload_dir: uploads.path().to_path_buf(),
            ..ServerConfig::default()
        };
        adjust(&mut config);

        let state = AppState::new(config, Store::memory());
        let router = create_app(state.clone());
        Self { router, state, uploads }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::DELETE, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn put_empty(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::PUT, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let request = request(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(&self, method: Method, uri: &str, token: Option<&str>, form: MultipartBody) -> TestResponse {
        let request = request(method, uri, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

/// Hand-built `multipart/form-data` body
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                MULTIPART_BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
        self.bytes
    }
}

/// A few bytes that pass as a PNG upload
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";
