//! `taskpilot status` — Show system status.

use taskpilot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("TaskPilot Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", config.default_model);
    println!("  Temperature:  {}", config.default_temperature);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  API keys:     {}", config.gateway.api_keys.len());
    println!(
        "  Rate limit:   {} req / {}s",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
    println!(
        "  LLM key:      {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );

    // Check config file existence
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `taskpilot onboard` first");
    }

    // Provider reachability
    let router = taskpilot_providers::build_from_config(&config);
    if let Some(provider) = router.default() {
        use taskpilot_core::provider::Provider as _;
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider reachable"),
            Ok(false) => println!("  ⚠️  Provider returned an error status"),
            Err(e) => println!("  ⚠️  Provider unreachable: {e}"),
        }
    }

    Ok(())
}
