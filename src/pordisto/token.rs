//! Session token issue and verification.
//!
//! The token is a three-part HS256 envelope carrying the principal's email
//! plus issue and expiry times, signed with the provider client secret.

use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;

use crate::pordisto::principal::Principal;

/// Session token failures.
///
/// Verification variants all collapse to `401` at the HTTP boundary; the
/// distinction only feeds server-side diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token envelope")]
    Malformed,
    #[error("token declares a non-HMAC algorithm")]
    AlgorithmMismatch,
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error("token is past its expiry")]
    Expired,
    #[error("email claim missing or not a string")]
    ClaimMissing,
    #[error("unable to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens under a fixed symmetric key.
pub struct Codec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Codec {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a fresh token for the principal; a new envelope on every call.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the HMAC computation fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let iat = jsonwebtoken::get_current_timestamp();
        let claims = json!({
            "email": principal.email(),
            "iat": iat,
            "exp": iat + self.ttl.as_secs(),
        });

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify the envelope and recover the principal.
    ///
    /// The declared algorithm is checked against an HMAC allow-list before
    /// any signature comparison; a token does not get to pick its own
    /// verification algorithm.
    ///
    /// # Errors
    ///
    /// Returns the matching [`TokenError`] variant for an unparseable
    /// envelope, a non-HMAC algorithm, a bad signature, an expired token, or
    /// a missing email claim.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;

        if !matches!(
            header.alg,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::AlgorithmMismatch);
        }

        let claims = decode::<Value>(token, &self.decoding, &Validation::new(header.alg))
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
                _ => TokenError::Malformed,
            })?
            .claims;

        claims
            .get("email")
            .and_then(Value::as_str)
            .map(Principal::new)
            .ok_or(TokenError::ClaimMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    fn codec() -> Codec {
        Codec::new(
            &SecretString::from("test-signing-secret".to_string()),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let codec = codec();
        let token = codec.issue(&Principal::new("a@x.com")).unwrap();

        let principal = codec.verify(&token).unwrap();
        assert_eq!(principal.email(), "a@x.com");
    }

    #[test]
    fn test_fresh_envelope_per_issue() {
        let codec = codec();
        let principal = Principal::new("a@x.com");

        let first = codec.issue(&principal).unwrap();
        let second = codec.issue(&principal).unwrap();

        // Same claims within one second, but both must verify regardless.
        assert_eq!(codec.verify(&first).unwrap(), codec.verify(&second).unwrap());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec().issue(&Principal::new("a@x.com")).unwrap();

        let other = Codec::new(
            &SecretString::from("another-secret".to_string()),
            Duration::from_secs(3600),
        );

        assert!(matches!(
            other.verify(&token),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            codec().verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        // Hand-rolled envelope declaring RS256; must be rejected before any
        // signature comparison is attempted.
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = Base64UrlUnpadded::encode_string(br#"{"email":"a@x.com"}"#);
        let token = format!("{header}.{payload}.c2lnbmF0dXJl");

        assert!(matches!(
            codec().verify(&token),
            Err(TokenError::AlgorithmMismatch)
        ));
    }

    #[test]
    fn test_missing_email_claim_rejected() {
        let codec = codec();
        let iat = jsonwebtoken::get_current_timestamp();
        let claims = json!({ "iat": iat, "exp": iat + 3600 });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(TokenError::ClaimMissing)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let iat = jsonwebtoken::get_current_timestamp() - 7200;
        let claims = json!({ "email": "a@x.com", "iat": iat, "exp": iat + 3600 });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue(&Principal::new("a@x.com")).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let iat = jsonwebtoken::get_current_timestamp();
        let forged = json!({ "email": "evil@x.com", "iat": iat, "exp": iat + 3600 }).to_string();
        let forged = Base64UrlUnpadded::encode_string(forged.as_bytes());
        parts[1] = &forged;
        let tampered = parts.join(".");

        assert!(matches!(
            codec.verify(&tampered),
            Err(TokenError::SignatureInvalid)
        ));
    }
}
