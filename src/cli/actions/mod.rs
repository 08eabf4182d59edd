pub mod server;

use secrecy::SecretString;

/// Actions
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        client_id: String,
        client_secret: SecretString,
        token_ttl: u64,
    },
}
