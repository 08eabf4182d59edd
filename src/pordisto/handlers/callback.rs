//! Provider redirect target: finish the exchange, mint the session token.

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::IntoParams;

use super::{append_cookie, redirect, valid_email};
use crate::pordisto::{
    oauth::FetchError,
    principal::{cookie_value, Principal},
    state::{AUTH_COOKIE, STATE_COOKIE},
    AuthState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackParams {
    /// Authorization code handed back by the provider.
    pub code: String,
    /// Correlation value expected to match the one sent at login.
    #[serde(default)]
    pub state: Option<String>,
}

#[utoipa::path(
    get,
    path = "/callback",
    params(CallbackParams),
    responses(
        (status = 302, description = "Login complete; session cookie set"),
        (status = 400, description = "Correlation mismatch, rejected code, or account without a primary email"),
        (status = 502, description = "Provider user-info call failed"),
        (status = 500, description = "Token signing failed"),
    ),
    tag = "auth"
)]
pub async fn callback(
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    // Exact match against the value sent out at login; anything else is a
    // forged or replayed callback.
    let expected = cookie_value(&headers, STATE_COOKIE);
    if expected.is_none() || params.state != expected {
        error!("authorization state mismatch");
        return failure(StatusCode::BAD_REQUEST, "state mismatch");
    }

    let token = match auth.github().exchange(&params.code).await {
        Ok(token) => token,
        Err(err) => {
            error!("code exchange failed: {err}");
            return failure(StatusCode::BAD_REQUEST, "auth error");
        }
    };

    let email = match auth.github().primary_email(&token).await {
        Ok(email) => email,
        Err(err @ FetchError::NoPrimaryEmail) => {
            error!("{err}");
            return failure(StatusCode::BAD_REQUEST, "no primary email");
        }
        Err(err) => {
            error!("user email fetch failed: {err}");
            return failure(StatusCode::BAD_GATEWAY, "provider error");
        }
    };

    if !valid_email(&email) {
        error!("provider returned an implausible email address");
        return failure(StatusCode::BAD_GATEWAY, "provider error");
    }

    let principal = Principal::new(email);

    let signed = match auth.codec().issue(&principal) {
        Ok(signed) => signed,
        Err(err) => {
            error!("unable to sign session token for {}: {err}", principal.email());
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        }
    };

    info!("session established for {}", principal.email());

    let mut cookies = HeaderMap::new();
    append_cookie(
        &mut cookies,
        &format!(
            "{AUTH_COOKIE}={signed}; Path=/; SameSite=Lax; Max-Age={}",
            auth.codec().ttl().as_secs()
        ),
    );
    append_cookie(
        &mut cookies,
        &format!("{STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    redirect("/", cookies)
}

/// Terminal error response; the correlation cookie is cleared either way.
fn failure(status: StatusCode, message: &'static str) -> Response {
    let mut headers = HeaderMap::new();
    append_cookie(
        &mut headers,
        &format!("{STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    (status, headers, message).into_response()
}
