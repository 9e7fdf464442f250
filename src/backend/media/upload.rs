/**
 * Image Upload Storage
 *
 * Uploaded images are written to a local directory and served back under
 * `/uploads`. Records store the server-relative reference
 * (`/uploads/<file>`); responses rewrite it against the public base URL.
 *
 * # Accepted Files
 *
 * - extension `.jpeg`, `.jpg` or `.png` (case-insensitive)
 * - content type `image/jpeg` or `image/png`
 * - non-empty and no larger than the configured limit
 *
 * # Naming
 *
 * Files are stored as `<unix-millis>-<sanitized original name>`. The original
 * name is reduced to its final path component and to `[A-Za-z0-9._-]`, so a
 * client cannot address anything outside the upload directory.
 */

use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::shared::views::absolute_media_url;

/// Route prefix under which stored files are served
pub const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];
const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Only .jpeg, .jpg and .png images are allowed")]
    UnsupportedType,

    #[error("Image exceeds the {max} byte limit")]
    TooLarge { max: usize },

    #[error("Uploaded file is empty")]
    Empty,

    #[error("media storage failed: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Whether the failure is the client's fault (bad file) rather than ours
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MediaError::Io(_))
    }
}

/// A file received in a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

/// Reduce a client-supplied file name to a safe single component.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.len() > MAX_NAME_LEN {
        &cleaned[cleaned.len() - MAX_NAME_LEN..]
    } else {
        cleaned
    };
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), MediaError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Absolute URL for a stored reference
    pub fn url_for(&self, stored: &str) -> String {
        absolute_media_url(&self.public_base_url, stored)
    }

    pub fn validate(&self, upload: &Upload) -> Result<(), MediaError> {
        let content_type_ok = upload
            .content_type
            .as_deref()
            .map(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !has_allowed_extension(&upload.file_name) || !content_type_ok {
            return Err(MediaError::UnsupportedType);
        }
        if upload.data.is_empty() {
            return Err(MediaError::Empty);
        }
        if upload.data.len() > self.max_bytes {
            return Err(MediaError::TooLarge { max: self.max_bytes });
        }
        Ok(())
    }

    /// Validate and write an upload. Returns the stored reference.
    pub async fn save(&self, upload: &Upload) -> Result<String, MediaError> {
        self.validate(upload)?;
        self.ensure_root().await?;

        let name = sanitize_file_name(&upload.file_name);
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let file_name = format!("{}-{}", millis, name);
            let path = self.root.join(&file_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&upload.data).await?;
                    file.flush().await?;
                    tracing::info!("Stored upload {} ({} bytes)", file_name, upload.data.len());
                    return Ok(format!("{}/{}", UPLOADS_ROUTE, file_name));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    millis += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Delete a stored file. Failures are logged, not returned.
    pub async fn remove(&self, stored: &str) {
        let Some(file_name) = stored.strip_prefix(UPLOADS_ROUTE).map(|s| s.trim_start_matches('/')) else {
            tracing::debug!("Not removing {}: not a local upload", stored);
            return;
        };
        if file_name.is_empty() || sanitize_file_name(file_name) != file_name {
            tracing::warn!("Refusing to remove suspicious upload path: {}", stored);
            return;
        }
        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => tracing::info!("Removed upload {}", file_name),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Upload {} already gone", file_name)
            }
            Err(e) => tracing::warn!("Failed to remove upload {}: {:?}", file_name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn png(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG fake"),
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("me.png"), "me.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my pic.JPG"), "my_pic.JPG");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path(), "http://localhost:8000", 1024);

        let stored = media.save(&png("cat.png")).await.unwrap();
        assert!(stored.starts_with("/uploads/"));
        assert!(stored.ends_with("-cat.png"));

        let file_name = stored.trim_start_matches("/uploads/");
        assert!(dir.path().join(file_name).exists());
        assert_eq!(
            media.url_for(&stored),
            format!("http://localhost:8000{}", stored)
        );

        media.remove(&stored).await;
        assert!(!dir.path().join(file_name).exists());
    }

    #[tokio::test]
    async fn test_same_name_twice_gets_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path(), "http://localhost:8000", 1024);
        let a = media.save(&png("dup.png")).await.unwrap();
        let b = media.save(&png("dup.png")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path(), "http://localhost:8000", 4);

        assert_matches!(media.save(&png("doc.gif")).await, Err(MediaError::UnsupportedType));

        let mut wrong_type = png("x.png");
        wrong_type.content_type = Some("text/plain".into());
        assert_matches!(media.save(&wrong_type).await, Err(MediaError::UnsupportedType));

        assert_matches!(media.save(&png("big.png")).await, Err(MediaError::TooLarge { max: 4 }));

        let mut empty = png("e.png");
        empty.data = Bytes::new();
        assert_matches!(media.save(&empty).await, Err(MediaError::Empty));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_saved_files_land_in_root(stem in "[A-Za-z0-9 _()-][A-Za-z0-9 ._()-]{0,40}") {
            let dir = tempfile::tempdir().unwrap();
            let media = MediaStore::new(dir.path(), "http://localhost:8000", 1024);

            let stored = tokio_test::block_on(media.save(&png(&format!("{}.png", stem)))).unwrap();
            let file_name = stored.trim_start_matches("/uploads/");
            prop_assert!(!file_name.contains('/'));
            prop_assert!(dir.path().join(file_name).is_file());
        }
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_stay_in_directory(name in ".{0,200}") {
            let cleaned = sanitize_file_name(&name);
            prop_assert!(!cleaned.is_empty());
            prop_assert!(!cleaned.contains('/') && !cleaned.contains('\\'));
            prop_assert!(!cleaned.starts_with('.'));
            prop_assert!(cleaned.len() <= MAX_NAME_LEN);
        }
    }
}
