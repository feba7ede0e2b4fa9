//! `enamai onboard` — First-time setup.

use enamai_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🦷 enamAI — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set [vertex] project_id and location in {}", config_path.display());
        println!("   2. Export an access token:");
        println!("        export ENAMAI_ACCESS_TOKEN=$(gcloud auth print-access-token)");
        println!("   3. Review the [clinic] section: hours, services, pricing");
        println!("   4. Run: enamai serve\n");
    }

    println!("🎉 Setup complete! Run `enamai chat` to try the assistant.\n");

    Ok(())
}
