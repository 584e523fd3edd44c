use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::StorageError;
use super::{build_storage_key, ensure_safe_key, is_absolute_url, StorageBackend};

/// Stores files under a directory on local disk and exposes them below a
/// root-relative URL prefix such as `/media/`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        let trimmed = url_prefix.trim().trim_end_matches('/');
        let url_prefix = if trimmed.starts_with('/') || is_absolute_url(trimmed) {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };

        LocalStorage { root: root.into(), url_prefix }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let key = ensure_safe_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store(&self, directory: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let key = build_storage_key(directory, file_name);
        let path = self.path_for(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        info!(key = %key, size = bytes.len(), "Stored file on local disk");
        Ok(key)
    }

    fn url_of(&self, key: &str) -> String {
        if is_absolute_url(key) {
            return key.to_string();
        }
        format!("{}/{}", self.url_prefix, key.trim_start_matches('/'))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        if is_absolute_url(key) {
            return Ok(true);
        }
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if is_absolute_url(key) {
            debug!(key = %key, "Skipping delete of externally hosted file");
            return Ok(());
        }
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(key = %key, "Deleted file from local disk");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
