use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{errors::StorageError, settings::{AppConfig, StorageKind}};

pub mod local;
pub mod remote;

pub use local::LocalStorage;
pub use remote::RemoteStorage;

/// Where uploaded media lives. The record store only keeps the key returned
/// by `store`; URLs are derived from it on every read.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persists `bytes` under a fresh key inside `directory` and returns the key.
    async fn store(&self, directory: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError>;

    /// Absolute URL or root-relative path for a stored key.
    fn url_of(&self, key: &str) -> String;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Removing a key that no longer exists is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub fn build_storage(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.storage_backend {
        StorageKind::Local => Ok(Arc::new(LocalStorage::new(&config.media_root, &config.media_url))),
        StorageKind::Remote => {
            let public_base = config.remote_public_base_url.as_deref().ok_or_else(|| {
                StorageError::Misconfigured("remote_public_base_url is not set".into())
            })?;
            let upload_url = config.remote_upload_url.as_deref().ok_or_else(|| {
                StorageError::Misconfigured("remote_upload_url is not set".into())
            })?;
            let storage = RemoteStorage::new(public_base, upload_url, config.remote_api_token.clone())?;
            Ok(Arc::new(storage))
        }
    }
}

/// Builds `directory/<slugified-stem>-<suffix>.<ext>` from an uploaded file name.
pub fn build_storage_key(directory: &str, file_name: &str) -> String {
    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, extension) = match base_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base_name, None),
    };

    let mut stem = slug::slugify(stem);
    if stem.is_empty() {
        stem = "file".to_string();
    }
    stem.truncate(80);

    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    let extension = extension
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let directory = directory.trim_matches('/');
    match extension {
        Some(ext) => format!("{directory}/{stem}-{suffix}.{ext}"),
        None => format!("{directory}/{stem}-{suffix}"),
    }
}

/// Rejects keys that could escape the storage root.
pub fn ensure_safe_key(key: &str) -> Result<&str, StorageError> {
    let unsafe_key = key.trim().is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");

    if unsafe_key {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

/// Keys that are already absolute URLs are served as-is by every backend.
pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| !url.cannot_be_a_base())
}
