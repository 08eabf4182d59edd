use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        client_id: matches
            .get_one::<String>("client-id")
            .map(String::to_string)
            .context("missing required argument: --client-id")?,
        client_secret: matches
            .get_one::<String>("client-secret")
            .map(|s| SecretString::from(s.clone()))
            .context("missing required argument: --client-secret")?,
        token_ttl: matches.get_one::<u64>("token-ttl").copied().unwrap_or(86400),
    })
}
