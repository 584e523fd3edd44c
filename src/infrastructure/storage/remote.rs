use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::errors::StorageError;
use super::{build_storage_key, ensure_safe_key, is_absolute_url, StorageBackend};

/// HTTP object store: uploads go to `upload_url/<key>` with PUT, files are
/// public under `public_base_url/<key>`.
#[derive(Clone)]
pub struct RemoteStorage {
    client: Client,
    public_base_url: Url,
    upload_url: Url,
    api_token: Option<Zeroizing<String>>,
}

impl RemoteStorage {
    pub fn new(public_base_url: &str, upload_url: &str, api_token: Option<String>) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(StorageError::from)?;

        Ok(RemoteStorage {
            client,
            public_base_url: parse_base(public_base_url)?,
            upload_url: parse_base(upload_url)?,
            api_token: api_token.filter(|t| !t.is_empty()).map(Zeroizing::new),
        })
    }

    fn object_url(base: &Url, key: &str) -> Result<Url, StorageError> {
        let key = ensure_safe_key(key)?;
        base.join(key)
            .map_err(|e| StorageError::InvalidKey(format!("{key}: {e}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }
}

/// `Url::join` replaces the last segment unless the base ends with a slash.
fn parse_base(raw: &str) -> Result<Url, StorageError> {
    let with_slash = if raw.ends_with('/') { raw.to_string() } else { format!("{raw}/") };
    Url::parse(&with_slash)
        .map_err(|e| StorageError::Misconfigured(format!("invalid storage URL {raw}: {e}")))
}

#[async_trait]
impl StorageBackend for RemoteStorage {
    async fn store(&self, directory: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let key = build_storage_key(directory, file_name);
        let target = Self::object_url(&self.upload_url, &key)?;
        let size = bytes.len();

        let response = self
            .authorized(self.client.put(target).body(bytes))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Remote(format!(
                "upload of {key} failed with status {}",
                response.status()
            )));
        }

        info!(key = %key, size, "Stored file in remote storage");
        Ok(key)
    }

    fn url_of(&self, key: &str) -> String {
        if is_absolute_url(key) {
            return key.to_string();
        }
        match Self::object_url(&self.public_base_url, key.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(key = %key, error = %e, "Could not build remote URL for key");
                format!("{}{}", self.public_base_url, key.trim_start_matches('/'))
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let target = if is_absolute_url(key) {
            Url::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))?
        } else {
            Self::object_url(&self.public_base_url, key)?
        };

        let response = self.client.head(target).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
            status => Err(StorageError::Remote(format!("existence check for {key} returned {status}"))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if is_absolute_url(key) {
            return Ok(());
        }
        let target = Self::object_url(&self.upload_url, key)?;
        let response = self.authorized(self.client.delete(target)).send().await?;

        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => {
                info!(key = %key, "Deleted file from remote storage");
                Ok(())
            }
            status => Err(StorageError::Remote(format!("delete of {key} returned {status}"))),
        }
    }
}

impl fmt::Debug for RemoteStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStorage")
            .field("public_base_url", &self.public_base_url.as_str())
            .field("upload_url", &self.upload_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
