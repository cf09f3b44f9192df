//! Logout command

use super::CommandContext;
use super::login::describe;
use social_login::ProviderId;

/// Handle the logout command
pub async fn handle_logout(context: &CommandContext, provider: ProviderId) -> Result<(), String> {
    let client = context.client();
    let options = context.config.options(provider);

    client
        .social_logout(provider, &options)
        .await
        .map_err(|e| describe(provider, e))?;

    println!("Logged out of {}.", provider.name());
    Ok(())
}
