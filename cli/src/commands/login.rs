//! Login command

use super::CommandContext;
use social_login::{Error, ProviderId};

/// Handle the login command
///
/// Redirect-flow providers without a session open the browser and stop here;
/// the flow is finished by running the command again with `--callback-url`.
pub async fn handle_login(context: &CommandContext, provider: ProviderId) -> Result<(), String> {
    let client = context.client();
    let options = context.config.options(provider);

    tokio::select! {
        result = client.social_login(provider, &options) => {
            let user = result.map_err(|e| describe(provider, e))?;
            let json = serde_json::to_string_pretty(&user)
                .map_err(|e| format!("Failed to serialize user: {}", e))?;
            println!("{}", json);
            Ok(())
        }
        _ = context.navigator.navigated() => {
            println!("After approving access, copy the address your browser was sent to and run:");
            println!();
            println!(
                "  social-login login --provider {} --callback-url '<redirected url>'",
                provider
            );
            Ok(())
        }
    }
}

pub(super) fn describe(provider: ProviderId, error: Error) -> String {
    match error {
        Error::ProviderNotRegistered(_) => format!(
            "{} needs its JavaScript SDK and cannot be used from a terminal",
            provider.name()
        ),
        Error::Provider(social) if !social.error.is_null() => {
            format!("{} ({})", social, social.error)
        }
        other => other.to_string(),
    }
}
