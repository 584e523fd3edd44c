use std::fmt;

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use url::Url;

use crate::storage::StorageBackend;

/// `scheme://host` of the current request, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        RequestOrigin { scheme: scheme.into(), host: host.into() }
    }

    fn as_base_url(&self) -> Option<Url> {
        Url::parse(&format!("{}://{}/", self.scheme, self.host)).ok()
    }
}

impl fmt::Display for RequestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// Honours `Forwarded`, `X-Forwarded-Proto`/`X-Forwarded-Host` and `Host`.
impl FromRequest for RequestOrigin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let info = req.connection_info();
        ready(Ok(RequestOrigin::new(info.scheme(), info.host())))
    }
}

/// Turns a URL handed out by a storage backend into an absolute URL.
///
/// Absolute URLs (remote object storage) pass through untouched. Anything
/// else is treated as a path on the current host.
pub fn resolve_media_url(raw: &str, origin: &RequestOrigin) -> String {
    if let Ok(url) = Url::parse(raw) {
        if !url.cannot_be_a_base() {
            return raw.to_string();
        }
    }

    match origin.as_base_url().and_then(|base| base.join(raw).ok()) {
        Some(url) => url.to_string(),
        None => {
            tracing::warn!(origin = %origin, raw, "Could not absolutise media URL");
            raw.to_string()
        }
    }
}

/// Resolved public URL for an optional storage key; blank keys mean no file.
pub fn resolve_stored_url(
    storage: &dyn StorageBackend,
    key: Option<&str>,
    origin: &RequestOrigin,
) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| resolve_media_url(&storage.url_of(k), origin))
}
