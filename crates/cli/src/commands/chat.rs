//! `taskpilot chat` — Interactive or single-message chat mode.
//!
//! Runs the same agent the gateway serves, against a local in-memory todo
//! store, without auth or rate limiting.

use std::io::Write;
use std::sync::Arc;
use taskpilot_agent::ChatAgent;
use taskpilot_config::AppConfig;
use taskpilot_core::todo::TodoStore;
use taskpilot_todos::InMemoryTodoStore;

/// The principal used for local CLI chats.
const LOCAL_USER: &str = "local";

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for an API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No LLM API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY='sk-...'");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-v1-...'");
        eprintln!("    export TASKPILOT_API_KEY='sk-...'       (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    // Build provider from config
    let router = taskpilot_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    // Build agent against a local in-memory store
    let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());
    let mut agent = ChatAgent::new(
        provider,
        &config.default_model,
        config.default_temperature,
        store,
    )
    .with_max_tokens(config.default_max_tokens)
    .with_max_iterations(config.agent.max_tool_iterations);

    if let Some(prompt) = &config.agent.system_prompt_override {
        agent = agent.with_system_prompt(prompt);
    }

    let session_id = "cli";

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = agent.process_chat(&msg, session_id, LOCAL_USER).await?;
        eprint!("\r              \r");
        println!("{}", reply.reply);
        return Ok(());
    }

    // Interactive mode
    println!("TaskPilot — type a message, or 'quit' to exit.\n");
    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        match agent.process_chat(line, session_id, LOCAL_USER).await {
            Ok(reply) => println!("taskpilot> {}\n", reply.reply),
            Err(e) => eprintln!("  error: {e}\n"),
        }
    }

    Ok(())
}
