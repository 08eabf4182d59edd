//! GitHub authorization-code exchange.
//!
//! Two outbound calls per login: trade the authorization code for an access
//! token, then read the account's email addresses and keep the one marked
//! primary. The access token is used exactly once and never persisted.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::APP_USER_AGENT;

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

/// Read-only access to the account's email addresses.
const EMAIL_SCOPE: &str = "user:email";

/// Budget per outbound call; an unresponsive provider must not pin the
/// handling task indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("token exchange request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider rejected the code exchange: status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("malformed token response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("provider reported the access token as unusable: {reason}")]
    TokenInvalid { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("user email request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider rejected the user email request: status {status}")]
    Rejected { status: u16 },
    #[error("malformed user email response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("no email address is marked primary")]
    NoPrimaryEmail,
}

/// Provider access token; used once during login, never handed to the client.
pub struct AccessToken(SecretString);

impl AccessToken {
    fn secret(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailRecord {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// Client for the provider's authorization-code flow.
///
/// Stateless; safe to share across request tasks. Endpoints are overridable
/// so tests can point the client at a local stub.
pub struct GithubClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    authorize_url: Url,
    token_url: Url,
    emails_url: Url,
}

impl GithubClient {
    /// Build a client around the registered OAuth application.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(client_id: String, client_secret: SecretString) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            authorize_url: GITHUB_AUTHORIZE_URL.parse().expect("valid default URL"),
            token_url: GITHUB_TOKEN_URL.parse().expect("valid default URL"),
            emails_url: GITHUB_EMAILS_URL.parse().expect("valid default URL"),
        })
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    /// Override the token exchange endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the user emails endpoint.
    #[must_use]
    pub fn with_emails_url(mut self, url: Url) -> Self {
        self.emails_url = url;
        self
    }

    /// Redirect target for one authorization round-trip.
    ///
    /// The provider redirects back to the callback URL registered with the
    /// OAuth application, so none is sent here.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", EMAIL_SCOPE)
            .append_pair("state", state);

        url
    }

    /// Trade the authorization code for a provider access token.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Transport`] on network failure,
    /// [`ExchangeError::Rejected`] on a non-2xx answer,
    /// [`ExchangeError::Decode`] on an unreadable body, and
    /// [`ExchangeError::TokenInvalid`] when the provider answers 2xx but the
    /// credential is unusable.
    pub async fn exchange(&self, code: &str) -> Result<AccessToken, ExchangeError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("code", code),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(ExchangeError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let envelope: TokenEnvelope = response.json().await.map_err(ExchangeError::Decode)?;

        // The provider answers 200 with an error body for a bad code.
        if let Some(error) = envelope.error {
            return Err(ExchangeError::TokenInvalid {
                reason: envelope.error_description.unwrap_or(error),
            });
        }

        match envelope.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken(SecretString::from(token))),
            _ => Err(ExchangeError::TokenInvalid {
                reason: "empty access token".to_string(),
            }),
        }
    }

    /// Fetch the account's email records and keep the primary one.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] on network failure,
    /// [`FetchError::Rejected`] on a non-2xx answer, [`FetchError::Decode`]
    /// on an unreadable body, and [`FetchError::NoPrimaryEmail`] when no
    /// record is marked primary.
    pub async fn primary_email(&self, token: &AccessToken) -> Result<String, FetchError> {
        let response = self
            .http
            .get(self.emails_url.clone())
            .bearer_auth(token.secret())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Rejected {
                status: status.as_u16(),
            });
        }

        let records: Vec<EmailRecord> = response.json().await.map_err(FetchError::Decode)?;

        select_primary(records).ok_or(FetchError::NoPrimaryEmail)
    }
}

fn select_primary(records: Vec<EmailRecord>) -> Option<String> {
    let record = records.into_iter().find(|record| record.primary)?;
    if !record.verified {
        warn!("primary email {} is not verified by the provider", record.email);
    }

    Some(record.email)
}

/// Fresh random correlation value for one authorization round-trip.
#[must_use]
pub fn correlation_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);

    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(
            "Iv1.cafe".to_string(),
            SecretString::from("s3cr3t".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = client().authorization_url("opaque-state");

        assert!(url
            .as_str()
            .starts_with("https://github.com/login/oauth/authorize"));

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".to_string(), "Iv1.cafe".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "user:email".to_string())));
        assert!(pairs.contains(&("state".to_string(), "opaque-state".to_string())));
    }

    #[test]
    fn test_endpoint_overrides() {
        let url: Url = "http://127.0.0.1:9/authorize".parse().unwrap();
        let client = client().with_authorize_url(url);

        assert!(client
            .authorization_url("s")
            .as_str()
            .starts_with("http://127.0.0.1:9/authorize"));
    }

    #[test]
    fn test_correlation_state_unique_and_url_safe() {
        let first = correlation_state();
        let second = correlation_state();

        assert_ne!(first, second);
        assert_eq!(first.len(), 22);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_select_primary_prefers_marked_record() {
        let records = vec![
            EmailRecord {
                email: "ci@y.com".to_string(),
                primary: false,
                verified: true,
            },
            EmailRecord {
                email: "b@y.com".to_string(),
                primary: true,
                verified: true,
            },
        ];

        assert_eq!(select_primary(records).as_deref(), Some("b@y.com"));
    }

    #[test]
    fn test_select_primary_none_marked() {
        let records = vec![EmailRecord {
            email: "ci@y.com".to_string(),
            primary: false,
            verified: true,
        }];

        assert_eq!(select_primary(records), None);
    }

    #[test]
    fn test_token_envelope_error_body() {
        let envelope: TokenEnvelope = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code is expired."}"#,
        )
        .unwrap();

        assert!(envelope.access_token.is_none());
        assert_eq!(envelope.error.as_deref(), Some("bad_verification_code"));
    }
}
