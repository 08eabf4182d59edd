//! # Pordisto
//!
//! A login gateway in front of a browser application: the user authenticates
//! against GitHub through the OAuth2 authorization-code flow, and `pordisto`
//! mints a signed session token (HS256 JWT) that the client presents on
//! subsequent API calls.
//!
//! The provider client secret doubles as the token signing key, so any
//! instance configured with the same OAuth application can verify the
//! tokens another instance issued. Tokens are self-contained; there is no
//! server-side session storage and no revocation.

pub mod cli;
pub mod pordisto;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
