//! `taskpilot serve` — Start the HTTP API server.

use taskpilot_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("TaskPilot Gateway");
    println!("  Listening:   {}:{}", config.gateway.host, config.gateway.port);
    println!("  API keys:    {}", config.gateway.api_keys.len());
    println!("  Rate limit:  {} req / {}s", config.rate_limit.max_requests, config.rate_limit.window_secs);

    taskpilot_gateway::start(config).await?;

    Ok(())
}
