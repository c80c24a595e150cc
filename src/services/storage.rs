//! Object storage for book covers

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Folder inside the bucket holding cover images
pub const COVERS_PREFIX: &str = "book-covers";

/// Path prefix under which bucket objects are served publicly
pub const PUBLIC_OBJECT_PATH: &str = "/storage/v1/object/public";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A bucket of publicly readable objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object under `key`
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Public URL of the object under `key`
    fn public_url(&self, key: &str) -> String;
}

/// Bucket stored as a directory on local disk
pub struct LocalObjectStore {
    bucket_dir: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            bucket_dir: config.root.join(&config.bucket),
            public_base: format!(
                "{}{}/{}",
                config.public_base_url.trim_end_matches('/'),
                PUBLIC_OBJECT_PATH,
                config.bucket
            ),
        }
    }

    fn object_path(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::BadRequest(format!("Invalid object key: {}", key)));
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create bucket directory: {}", e)))?;
        }

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write object {}: {}", key, e)))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// Random object key for an uploaded cover, keeping the image extension
pub fn cover_object_key(file_name: &str) -> AppResult<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Cover image must be one of: {}",
                IMAGE_EXTENSIONS.join(", ")
            ))
        })?;

    Ok(format!("{}/{}.{}", COVERS_PREFIX, Uuid::new_v4(), extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> LocalObjectStore {
        LocalObjectStore::new(&StorageConfig {
            root: root.to_path_buf(),
            bucket: "library".to_string(),
            public_base_url: "https://books.example.org/".to_string(),
            max_upload_bytes: 1024,
        })
    }

    #[test]
    fn cover_keys_keep_lowercased_image_extension() {
        let key = cover_object_key("My Cover.PNG").unwrap();
        assert!(key.starts_with("book-covers/"));
        assert!(key.ends_with(".png"));
        assert_ne!(cover_object_key("a.png").unwrap(), cover_object_key("a.png").unwrap());
    }

    #[test]
    fn non_images_are_rejected() {
        assert!(matches!(cover_object_key("notes.txt"), Err(AppError::Validation(_))));
        assert!(matches!(cover_object_key("no_extension"), Err(AppError::Validation(_))));
    }

    #[test]
    fn public_url_points_at_bucket() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            store(dir.path()).public_url("book-covers/x.png"),
            "https://books.example.org/storage/v1/object/public/library/book-covers/x.png"
        );
    }

    #[tokio::test]
    async fn put_writes_inside_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store
            .put("book-covers/x.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("library/book-covers/x.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn put_refuses_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let result = store.put("../outside.png", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        let absolute = store.put("/etc/passwd", Bytes::from_static(b"x")).await;
        assert!(absolute.is_err());
    }
}
