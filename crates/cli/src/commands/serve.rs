//! `enamai serve` — Start the HTTP API server.

use enamai_config::AppConfig;

pub async fn run(
    mut config: AppConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🦷 {}", config.app_name);
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.vertex.model);
    println!("   Origins:   {}", config.gateway.allowed_origins.join(", "));

    enamai_gateway::start(config).await?;

    Ok(())
}
