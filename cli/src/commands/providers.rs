//! List providers command

use super::CommandContext;
use social_login::ProviderId;

/// Handle the providers command
pub fn handle_providers(context: &CommandContext) {
    let client = context.client();
    let configured = context.config.configured_providers();

    println!("Supported providers:");
    println!();

    for id in ProviderId::ALL {
        let flow = if id.is_redirect_flow() {
            "redirect"
        } else {
            "popup"
        };
        let availability = if client.registry().has_provider(id) {
            "available"
        } else {
            "browser only"
        };
        let marker = if configured.contains(&id) {
            " (configured)"
        } else {
            ""
        };

        println!(
            "  {:<10} {:<18} {:<8} {}{}",
            id.as_str(),
            id.name(),
            flow,
            availability,
            marker
        );
    }

    if configured.is_empty() {
        println!();
        println!(
            "No providers configured. Add a [providers.<id>] section to ~/.social-login/config.toml."
        );
    }
}
