/**
 * Response Envelope
 *
 * Every API response, success or failure, uses the same JSON shape:
 *
 * ```json
 * { "status": "success", "message": "Post created", "data": { ... } }
 * { "status": "failure", "message": "Post not found" }
 * ```
 *
 * `message` and `data` are omitted when empty. Payloads always travel under
 * `data`, whatever the resource.
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ApiStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ApiStatus::Success
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Failure,
            message: Some(message.into()),
            data: None,
        }
    }
}
