//! Login decision point.

use axum::{http::HeaderMap, response::Response, Extension};
use std::sync::Arc;
use tracing::debug;

use super::{append_cookie, redirect};
use crate::pordisto::{
    oauth,
    principal::cookie_value,
    state::{AUTH_COOKIE, STATE_COOKIE},
    AuthState,
};

/// Lifetime of the correlation cookie; one authorization round-trip.
const STATE_COOKIE_MAX_AGE: u64 = 300;

/// Decide whether the caller needs to visit the provider.
///
/// A present session cookie short-circuits to the application root without
/// re-verification; a stale or tampered value surfaces on the next protected
/// request instead.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 302, description = "Redirect to the provider, or to the application root when a session cookie is already present"),
    ),
    tag = "auth"
)]
pub async fn login(Extension(auth): Extension<Arc<AuthState>>, headers: HeaderMap) -> Response {
    if cookie_value(&headers, AUTH_COOKIE).is_some() {
        return redirect("/", HeaderMap::new());
    }

    let state = oauth::correlation_state();
    let target = auth.github().authorization_url(&state);

    // Drop stale session state before starting a fresh round-trip.
    let mut cookies = HeaderMap::new();
    append_cookie(
        &mut cookies,
        &format!("{AUTH_COOKIE}=; Path=/; SameSite=Lax; Max-Age=0"),
    );
    append_cookie(
        &mut cookies,
        &format!(
            "{STATE_COOKIE}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE}"
        ),
    );

    debug!("redirecting to the provider authorization endpoint");

    redirect(target.as_str(), cookies)
}
