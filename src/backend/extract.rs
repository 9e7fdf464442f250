//! Request extractors whose rejections use the API envelope.
//!
//! `ApiJson` and `ApiQuery` wrap axum's `Json` and `Query` and turn their
//! rejections into `BackendError::InvalidArgument`, so a malformed body or
//! query string fails with the same `{"status": "failure", ...}` shape as
//! every other error. `MultipartForm` extracts a multipart body as text
//! fields and file uploads, with the same rejection shape.

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::backend::error::BackendError;
use crate::backend::media::Upload;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// A multipart body split into text fields and files
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    /// Drain `multipart`. A part with a file name is a file. A file part with
    /// an empty file name and no content (an untouched file input) is skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, BackendError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::warn!("Failed to read multipart field: {:?}", e);
            BackendError::from(e)
        })? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            file_name,
                            content_type,
                            data,
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::read(multipart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        description: String,
    }

    #[tokio::test]
    async fn test_api_json_accepts_valid_body() {
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"description":"hi"}"#))
            .unwrap();
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.description, "hi");
    }

    #[tokio::test]
    async fn test_api_json_rejection_is_bad_request() {
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_query_rejection_is_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Page {
            #[allow(dead_code)]
            page: u32,
        }
        let req = Request::builder().uri("/x?page=abc").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let err = ApiQuery::<Page>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
    #[tokio::test]
    async fn test_multipart_form_splits_fields_and_files() {
        let body = concat!(
            "--b\r\n",
            "Content-Disposition: form-data; name=\"description\"\r\n\r\n",
            "hello\r\n",
            "--b\r\n",
            "Content-Disposition: form-data; name=\"imgurl\"; filename=\"cat.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "PNGDATA\r\n",
            "--b\r\n",
            "Content-Disposition: form-data; name=\"empty\"; filename=\"\"\r\n",
            "Content-Type: application/octet-stream\r\n\r\n",
            "\r\n",
            "--b--\r\n",
        );
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=b")
            .body(Body::from(body))
            .unwrap();

        let mut form = MultipartForm::from_request(req, &()).await.unwrap();

        assert_eq!(form.text("description"), Some("hello"));
        let file = form.take_file("imgurl").unwrap();
        assert_eq!(file.file_name, "cat.png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(&file.data[..], b"PNGDATA");
        assert!(form.take_file("empty").is_none());
        assert!(form.take_file("imgurl").is_none());
    }

    #[tokio::test]
    async fn test_multipart_form_without_boundary_is_bad_request() {
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let err = MultipartForm::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
