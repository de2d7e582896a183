//! `taskpilot onboard` — First-time setup.

use taskpilot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("TaskPilot — First-Time Setup");
    println!("============================\n");

    // Create config directory
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    // Write default config (never overwrite an existing one)
    if !config_path.exists() {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created default config: {}", config_path.display());
    } else {
        println!("  Config file exists: {}", config_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  1. Set an LLM API key:");
    println!("       export OPENAI_API_KEY='sk-...'       (or TASKPILOT_API_KEY)");
    println!("  2. Add gateway API keys to {}:", config_path.display());
    println!("       [[gateway.api_keys]]");
    println!("       key = \"choose-a-long-random-key\"");
    println!("       user = \"your-user-id\"");
    println!("  3. Start the server:   taskpilot serve");
    println!("     Or chat locally:    taskpilot chat -m 'add buy milk to my list'");

    Ok(())
}
