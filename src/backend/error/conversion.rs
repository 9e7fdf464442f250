/**
 * Error Conversion
 *
 * Converts backend errors into HTTP responses, and converts axum's own
 * extractor rejections into backend errors so malformed requests get the
 * same envelope as every other failure.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "status": "failure",
 *   "message": "Post not found"
 * }
 * ```
 *
 * Server-side failures are logged with their full detail and returned with a
 * generic message.
 */

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;
use crate::shared::ApiResponse;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed with {}: {:?}", status, self);
        } else {
            tracing::warn!("Request rejected with {}: {}", status, self);
        }

        (status, Json(ApiResponse::failure(self.message()))).into_response()
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<MultipartRejection> for BackendError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<MultipartError> for BackendError {
    fn from(err: MultipartError) -> Self {
        Self::InvalidArgument(format!("Invalid multipart body: {}", err.body_text()))
    }
}
