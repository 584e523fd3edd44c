use actix_web::{http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{errors::AppError, AppState};

/// Proof that the request carried the admin bearer token.
/// Returns 401 when the header is missing, malformed or wrong.
/// Usage: add `_admin: AdminAccess` as a parameter to an admin handler.
#[derive(Debug)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing in admin extractor");
            return ready(Err(AppError::InternalError("application state not configured".into()).into()));
        };

        match extract_bearer(req) {
            Some(token) if tokens_match(token.as_bytes(), state.admin.token.as_bytes()) => {
                ready(Ok(AdminAccess))
            }
            Some(_) => {
                tracing::warn!(path = %req.path(), "Rejected admin request with wrong token");
                ready(Err(AppError::UnauthorizedAccess.into()))
            }
            None => ready(Err(AppError::UnauthorizedAccess.into())),
        }
    }
}

fn extract_bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compares in time independent of where the first mismatch is.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    if expected.is_empty() || given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::tokens_match;

    #[test]
    fn matching_tokens_are_accepted() {
        assert!(tokens_match(b"secret-token", b"secret-token"));
    }

    #[test]
    fn different_or_empty_tokens_are_rejected() {
        assert!(!tokens_match(b"secret-tokem", b"secret-token"));
        assert!(!tokens_match(b"secret", b"secret-token"));
        assert!(!tokens_match(b"", b""));
    }
}
