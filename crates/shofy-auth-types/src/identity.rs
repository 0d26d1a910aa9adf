//! Bearer session-token extractor.

use axum::extract::FromRequestParts;
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::cookie::SHOFY_TOKEN;

/// Raw session token presented by the caller.
///
/// Looked up in the `token` cookie first, then in an
/// `Authorization: Bearer <token>` header. Returns 401 if neither is present.
/// Signature, expiry and revocation checks are left to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SHOFY_TOKEN) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Extract synchronously and return a 'static future; see axum-core 0.5
    // `FromRequestParts` signature.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = token_from_parts(parts);
        if token.is_none() {
            tracing::debug!("no session token in cookie or authorization header");
        }

        async move { token.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
