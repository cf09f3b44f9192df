//! CLI commands
//!
//! - `social-login login --provider <id>` - Log in and print the user record
//! - `social-login logout --provider <id>` - End the provider session
//! - `social-login providers` - List supported providers

mod login;
mod logout;
mod providers;

use crate::browser::BrowserNavigator;
use clap::Subcommand;
use social_login::providers::{GithubProvider, InstagramProvider};
use social_login::{ProviderId, SocialConfig, SocialLogin};
use std::sync::Arc;

/// Top-level subcommands
#[derive(Subcommand, PartialEq, Debug)]
pub enum Commands {
    /// Log in with a provider and print the user record as JSON
    Login {
        /// Provider to log in with (e.g., "github", "instagram")
        #[arg(long)]
        provider: ProviderId,
    },

    /// Log out of a provider
    Logout {
        /// Provider to log out of
        #[arg(long)]
        provider: ProviderId,
    },

    /// List supported providers
    Providers,
}

/// Everything a command needs to run
pub struct CommandContext {
    pub config: SocialConfig,
    pub navigator: Arc<BrowserNavigator>,
}

impl CommandContext {
    /// Client over the providers a terminal can drive
    ///
    /// Popup-flow providers need a vendor JavaScript SDK and are not registered.
    pub fn client(&self) -> SocialLogin {
        SocialLogin::builder()
            .with_config(&self.config)
            .register_provider(GithubProvider::new(self.navigator.clone()))
            .register_provider(InstagramProvider::new(self.navigator.clone()))
            .build()
    }
}

impl Commands {
    /// Run the command
    pub async fn run(self, context: CommandContext) -> Result<(), String> {
        match self {
            Commands::Login { provider } => login::handle_login(&context, provider).await,
            Commands::Logout { provider } => logout::handle_logout(&context, provider).await,
            Commands::Providers => {
                providers::handle_providers(&context);
                Ok(())
            }
        }
    }
}
