//! `enamai config` — Configuration management commands.

use enamai_config::AppConfig;

const REDACTED: &str = "***";

pub async fn show(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_path().display());
    Ok(())
}

fn config_path() -> std::path::PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// Render the config as TOML with the access token masked.
fn render(mut config: AppConfig) -> Result<String, toml::ser::Error> {
    if config.vertex.access_token.is_some() {
        config.vertex.access_token = Some(REDACTED.into());
    }
    toml::to_string_pretty(&config)
}
