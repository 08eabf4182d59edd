//! Authenticated principal and the session middleware.

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::Arc;
use tracing::warn;

use crate::pordisto::AuthState;

/// The authenticated identity: a verified email, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    email: String,
}

impl Principal {
    /// Built only from a verified provider response or a verified token.
    pub(crate) fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Require a valid bearer credential and annotate the request with the
/// principal for downstream handlers.
///
/// Every verification failure collapses to a generic `401`; the distinct
/// cause stays in the server log.
pub async fn require_auth(
    Extension(auth): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    };

    match auth.codec().verify(&token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            warn!("rejecting bearer credential: {err}");
            (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
        }
    }
}

/// Token from the `Authorization` header. The browser client sends the raw
/// value; a `Bearer` prefix is tolerated.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))
        .unwrap_or(trimmed)
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Named cookie from the `Cookie` header, if present.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_token_raw_value() {
        let map = headers(AUTHORIZATION, "aaa.bbb.ccc");
        assert_eq!(bearer_token(&map).as_deref(), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn test_bearer_token_prefixed_value() {
        let map = headers(AUTHORIZATION, "Bearer aaa.bbb.ccc");
        assert_eq!(bearer_token(&map).as_deref(), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let map = headers(AUTHORIZATION, "   ");
        assert_eq!(bearer_token(&map), None);
    }

    #[test]
    fn test_cookie_value_among_many() {
        let map = headers(COOKIE, "theme=dark; auth=aaa.bbb.ccc; lang=eo");
        assert_eq!(cookie_value(&map, "auth").as_deref(), Some("aaa.bbb.ccc"));
        assert_eq!(cookie_value(&map, "missing"), None);
    }

    #[test]
    fn test_cookie_value_does_not_match_prefix_names() {
        let map = headers(COOKIE, "auth_state=nonce");
        assert_eq!(cookie_value(&map, "auth"), None);
        assert_eq!(cookie_value(&map, "auth_state").as_deref(), Some("nonce"));
    }
}
