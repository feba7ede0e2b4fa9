//! enamAI CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP API server
//! - `chat`     — Interactive or single-message chat
//! - `onboard`  — Write a default config file
//! - `status`   — Show configuration and provider status
//! - `config`   — Show or locate the config file

use clap::{Parser, Subcommand};
use enamai_config::AppConfig;
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

mod commands;

#[derive(Parser)]
#[command(
    name = "enamai",
    about = "enamAI — dental clinic chat assistant backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the assistant from the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Continue an existing session id
        #[arg(long)]
        session: Option<String>,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration and provider status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
}

/// Handle used to raise the log level once the config is known.
type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let (filter, filter_handle) = reload::Layer::new(log_filter(cli.verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let load = || load_config(&filter_handle, cli.verbose);

    match cli.command {
        Commands::Serve { port } => commands::serve::run(load()?, port).await?,
        Commands::Chat { message, session } => {
            commands::chat::run(load()?, message, session).await?
        }
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run(load()?).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(load()?).await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when requested.
fn log_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(debug)))
}

fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("{level},hyper=warn,reqwest=warn")
}

/// Load the config and apply its `debug` flag to the log filter.
fn load_config(filter: &FilterHandle, verbose: bool) -> enamai_core::Result<AppConfig> {
    let config = AppConfig::load()?;
    if config.debug && !verbose {
        if let Err(e) = filter.reload(log_filter(true)) {
            warn!(error = %e, "Failed to raise log level");
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_quiet_http_crates() {
        assert_eq!(default_directives(false), "info,hyper=warn,reqwest=warn");
        assert_eq!(default_directives(true), "debug,hyper=warn,reqwest=warn");
    }

    #[test]
    fn config_errors_surface_as_core_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nport = ").unwrap();

        let load = || -> enamai_core::Result<AppConfig> { Ok(AppConfig::load_from(&path)?) };
        match load() {
            Err(enamai_core::Error::Config { message }) => {
                assert!(message.contains("config.toml"));
            }
            other => panic!("Expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn debug_config_raises_log_level() {
        let (_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        // The layer stays alive, so reloading succeeds
        handle
            .reload(EnvFilter::new(default_directives(true)))
            .unwrap();
        let current = handle.with_current(|f| f.to_string()).unwrap();
        assert!(current.contains("debug"));
        assert!(current.contains("reqwest=warn"));
    }

    #[test]
    fn cli_parses_chat_with_session() {
        let cli = Cli::try_parse_from(["enamai", "chat", "-m", "hi", "--session", "abc"]).unwrap();
        match cli.command {
            Commands::Chat { message, session } => {
                assert_eq!(message.as_deref(), Some("hi"));
                assert_eq!(session.as_deref(), Some("abc"));
            }
            _ => panic!("Expected chat command"),
        }
    }
}
