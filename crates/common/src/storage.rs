//! Local filesystem storage for report attachments.
//!
//! Attachments are owned exclusively by their report and deleted with it, so
//! the backend only needs write, read, and delete over a flat key space.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Stored file metadata.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Storage key (file name under the upload directory).
    pub key: String,
    /// Absolute or base-relative path of the written file.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

/// Storage backend trait for attachment files.
#[async_trait::async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Write a file under the given key.
    async fn write(&self, key: &str, data: &[u8]) -> AppResult<StoredFile>;

    /// Read a file back by key.
    async fn read(&self, key: &str) -> AppResult<Vec<u8>>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend rooted at `base_path`.
    #[must_use]
    pub const fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait::async_trait]
impl AttachmentStorage for LocalStorage {
    async fn write(&self, key: &str, data: &[u8]) -> AppResult<StoredFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(StoredFile {
            key: key.to_string(),
            path: path.to_string_lossy().into_owned(),
            size: data.len() as u64,
        })
    }

    async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.base_path.join(key);
        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::NotFound(format!("Attachment file {key}: {e}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        Ok(path.exists())
    }
}

/// Generate a unique storage key for an uploaded attachment.
#[must_use]
pub fn generate_storage_key(report_id: i64, original_name: &str) -> String {
    use chrono::Utc;

    let date_path = Utc::now().format("%Y/%m").to_string();

    // Extract extension from original name
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && !ext.is_empty())
        .unwrap_or("bin");

    format!("{date_path}/{report_id}_{}.{extension}", uuid::Uuid::new_v4())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key(42, "screenshot.png");
        assert!(key.contains("42_"));
        assert!(key.ends_with(".png"));
        assert!(key.contains('/'));
    }

    #[test]
    fn test_generate_storage_key_no_extension() {
        let key = generate_storage_key(42, "evidence");
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_generate_storage_key_is_unique() {
        let a = generate_storage_key(1, "a.jpg");
        let b = generate_storage_key(1, "a.jpg");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_local_storage_roundtrip() {
        let dir = std::env::temp_dir().join(format!("reportd-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.clone());

        let stored = storage.write("x/y.bin", b"hello").await.unwrap();
        assert_eq!(stored.size, 5);
        assert!(storage.exists("x/y.bin").await.unwrap());
        assert_eq!(storage.read("x/y.bin").await.unwrap(), b"hello");

        storage.delete("x/y.bin").await.unwrap();
        assert!(!storage.exists("x/y.bin").await.unwrap());
        // Deleting again is a no-op
        storage.delete("x/y.bin").await.unwrap();

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
