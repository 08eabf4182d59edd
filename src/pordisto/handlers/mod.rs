pub mod callback;
pub mod health;
pub mod login;
pub mod me;


// common functions for the handlers
use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use regex::Regex;

/// Landing page; the real UI is served elsewhere.
pub async fn index() -> Html<&'static str> {
    Html(r#"<a href="/login">Sign in with GitHub</a>"#)
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// `302` with any accumulated `Set-Cookie` headers.
pub(crate) fn redirect(location: &str, mut headers: HeaderMap) -> Response {
    match location.parse() {
        Ok(value) => {
            headers.insert(LOCATION, value);
            (StatusCode::FOUND, headers).into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(SET_COOKIE, value);
    }
}
