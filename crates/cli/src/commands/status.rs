//! `enamai status` — Show configuration and provider status.

use enamai_config::AppConfig;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {

    println!("🦷 enamAI Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Clinic:       {}", config.clinic.name);
    println!("  Persona:      {}", config.clinic.persona);
    println!("  Project:      {}", config.vertex.project_id);
    println!("  Location:     {}", config.vertex.location);
    println!("  Model:        {}", config.vertex.model);
    println!("  Temperature:  {}", config.prediction.temperature);
    println!("  Timeout:      {}s", config.vertex.timeout_secs);
    println!("  Sessions:     {} turns kept, {} in context", config.sessions.max_turns, config.sessions.context_turns);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  Access token: {}",
        if config.vertex.access_token.is_some() { "set" } else { "missing" }
    );

    let status = enamai_providers::initialize(&config);
    match status.reason() {
        None => println!("\n  ✅ Prediction provider ready"),
        Some(reason) => {
            println!("\n  ⚠️  Prediction provider unavailable: {reason}");
            println!("     Chat will answer from the fallback rules.");
        }
    }

    // Check config file existence
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `enamai onboard` first");
    }

    Ok(())
}
