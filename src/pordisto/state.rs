//! Immutable per-process auth state shared by every request task.

use anyhow::Result;
use std::time::Duration;

use crate::cli::globals::GlobalArgs;
use crate::pordisto::{oauth::GithubClient, token::Codec};

/// Session cookie holding the signed token. The browser client reads it, so
/// it is deliberately not `HttpOnly`.
pub const AUTH_COOKIE: &str = "auth";

/// Correlation cookie for one authorization round-trip; server-only.
pub const STATE_COOKIE: &str = "auth_state";

pub struct AuthState {
    codec: Codec,
    github: GithubClient,
}

impl AuthState {
    /// Wire the codec and the provider client from startup configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client cannot be constructed.
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        Ok(Self {
            codec: Codec::new(
                &globals.client_secret,
                Duration::from_secs(globals.token_ttl),
            ),
            github: GithubClient::new(globals.client_id.clone(), globals.client_secret.clone())?,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(codec: Codec, github: GithubClient) -> Self {
        Self { codec, github }
    }

    #[must_use]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    #[must_use]
    pub fn github(&self) -> &GithubClient {
        &self.github
    }
}
