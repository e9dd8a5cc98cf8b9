use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Storage configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque blob store for verification documents. The metadata record keeps
/// the key returned by `upload`; nothing else in the system touches bytes.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Stores the blob and returns its storage key.
    async fn upload(&self, stored_name: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Compensating delete for a blob whose metadata write failed.
    async fn delete(&self, storage_key: &str) -> Result<(), StorageError>;
}

/// Random stored name preserving the original extension, mirroring how the
/// uploads bucket names its objects.
pub fn generate_stored_name(original_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", suffix, ext.to_ascii_lowercase()),
        None => suffix,
    }
}

/// Filesystem-backed blob store rooted at a configured directory.
#[derive(Clone)]
pub struct LocalDocumentStorage {
    base_path: PathBuf,
}

impl LocalDocumentStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self { base_path })
    }

    /// Keys are flat file names; anything that could escape the base
    /// directory is refused.
    fn key_to_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key.contains("..")
            || key.contains('/')
            || key.contains('\\')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl DocumentStorage for LocalDocumentStorage {
    async fn upload(&self, stored_name: &str, data: &[u8]) -> Result<String, StorageError> {
        let path = self.key_to_path(stored_name)?;
        fs::write(&path, data).await?;

        info!("Stored document blob {} ({} bytes)", stored_name, data.len());
        Ok(stored_name.to_string())
    }

    async fn delete(&self, storage_key: &str) -> Result<(), StorageError> {
        let path = self.key_to_path(storage_key)?;
        fs::remove_file(&path).await?;

        info!("Deleted document blob {}", storage_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_keeps_lowercased_extension() {
        let name = generate_stored_name("Passport.PDF");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 16 + 4);
    }

    #[test]
    fn stored_name_without_extension_is_bare() {
        let name = generate_stored_name("scan");
        assert_eq!(name.len(), 16);
        assert!(!name.contains('.'));
    }

    #[test]
    fn stored_names_are_unique() {
        assert_ne!(generate_stored_name("a.png"), generate_stored_name("a.png"));
    }

    #[tokio::test]
    async fn upload_then_delete_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDocumentStorage::new(dir.path()).await.unwrap();

        let key = storage.upload("blob.pdf", b"content").await.unwrap();
        assert_eq!(key, "blob.pdf");
        assert_eq!(fs::read(dir.path().join("blob.pdf")).await.unwrap(), b"content");

        storage.delete(&key).await.unwrap();
        assert!(!dir.path().join("blob.pdf").exists());
    }

    #[tokio::test]
    async fn traversal_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDocumentStorage::new(dir.path()).await.unwrap();

        for key in ["../escape.pdf", "a/b.pdf", "", "..\\win.pdf"] {
            assert!(matches!(
                storage.upload(key, b"x").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
