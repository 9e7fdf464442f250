//! Envelope assertions
//!
//! Every response carries `{status, message?, data?}`; these helpers check
//! the HTTP status and envelope status together so failures print the body.

use axum::http::StatusCode;

use super::app::TestResponse;

/// Assert a success envelope with the given HTTP status
pub fn assert_success(response: &TestResponse, status: StatusCode) {
    assert_eq!(response.status, status, "unexpected status, body: {}", response.body);
    assert_eq!(response.body["status"], "success", "body: {}", response.body);
}

/// Assert a failure envelope with the given HTTP status and message
pub fn assert_failure(response: &TestResponse, status: StatusCode, message: &str) {
    assert_eq!(response.status, status, "unexpected status, body: {}", response.body);
    assert_eq!(response.body["status"], "failure", "body: {}", response.body);
    assert_eq!(response.message(), Some(message), "body: {}", response.body);
}

/// Assert a failure envelope without pinning the message
pub fn assert_failure_status(response: &TestResponse, status: StatusCode) {
    assert_eq!(response.status, status, "unexpected status, body: {}", response.body);
    assert_eq!(response.body["status"], "failure", "body: {}", response.body);
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
