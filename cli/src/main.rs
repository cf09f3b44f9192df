use clap::Parser;
use social_login::SocialConfig;
use social_login::host::Url;
use std::path::PathBuf;
use std::sync::Arc;

mod browser;
mod commands;

use browser::BrowserNavigator;
use commands::{CommandContext, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, PartialEq, Debug)]
#[command(name = "social-login")]
#[command(about = "Log in with a social identity provider", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ~/.social-login/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// URL the provider redirected the browser back to
    #[arg(long = "callback-url", global = true)]
    callback_url: Option<String>,

    /// Enable debug output
    #[arg(long = "debug", default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    format!("error,{}=debug,social_login=debug", env!("CARGO_CRATE_NAME")).into()
                }),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let callback = match cli.callback_url.as_deref().map(Url::parse).transpose() {
        Ok(callback) => callback,
        Err(e) => {
            eprintln!("Invalid --callback-url: {}", e);
            std::process::exit(1);
        }
    };

    let context = CommandContext {
        config,
        navigator: Arc::new(BrowserNavigator::new(callback)),
    };

    if let Err(e) = cli.command.run(context).await {
        eprintln!("Ops! something went wrong: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> social_login::Result<SocialConfig> {
    match path {
        Some(path) => {
            let mut config = SocialConfig::load(path)?;
            config.apply_env();
            Ok(config)
        }
        None => SocialConfig::from_default_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_login::ProviderId;

    #[test]
    fn test_parse_login_command() {
        let cli = Cli::try_parse_from([
            "social-login",
            "login",
            "--provider",
            "github",
            "--callback-url",
            "http://localhost:3000/?rslCallback=github&code=ABC",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::Login {
                provider: ProviderId::Github
            }
        );
        assert!(cli.callback_url.is_some());
        assert!(!cli.debug);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["social-login", "logout", "--provider", "myspace"]).is_err());
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[providers.github]\napp_id = \"gh\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.configured_providers().contains(&ProviderId::Github));
    }
}
