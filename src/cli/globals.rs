use secrecy::SecretString;

/// Immutable provider configuration established at startup and handed to
/// each component at construction.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_ttl: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(client_id: String, client_secret: SecretString, token_ttl: u64) -> Self {
        Self {
            client_id,
            client_secret,
            token_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "Iv1.cafe".to_string(),
            SecretString::from("s3cr3t".to_string()),
            86400,
        );
        assert_eq!(args.client_id, "Iv1.cafe");
        assert_eq!(args.client_secret.expose_secret(), "s3cr3t");
        assert_eq!(args.token_ttl, 86400);
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let args = GlobalArgs::new(
            "Iv1.cafe".to_string(),
            SecretString::from("s3cr3t".to_string()),
            86400,
        );
        let debug = format!("{args:?}");
        assert!(!debug.contains("s3cr3t"));
    }
}
