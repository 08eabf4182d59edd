use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::pordisto;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            client_id,
            client_secret,
            token_ttl,
        } => {
            let globals = GlobalArgs::new(client_id, client_secret, token_ttl);

            pordisto::new(port, &globals).await?;
        }
    }

    Ok(())
}
