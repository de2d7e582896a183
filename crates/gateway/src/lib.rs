//! HTTP API gateway for TaskPilot.
//!
//! Exposes the AI chat endpoint plus a health check, with the request
//! pipeline the API promises: auth → rate limit → input validation →
//! agent delegate → output sanitize → response.
//!
//! Built on Axum. All shared subsystems (provider, todo store, agent) are
//! built ONCE in `start()` and injected into the router — no process-wide
//! singletons.

pub mod api;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod test_support;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    middleware::{self, Next},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use taskpilot_agent::ChatAgent;
use taskpilot_config::ValidationConfig;
use taskpilot_core::todo::TodoStore;
use taskpilot_todos::InMemoryTodoStore;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::api::ApiError;

/// Shared application state for the gateway.
pub struct GatewayState {
    /// The chat agent, built once at startup.
    pub agent: Arc<ChatAgent>,

    /// Accepted bearer keys → the user id each authenticates as.
    pub api_keys: HashMap<String, String>,

    /// Input validation limits.
    pub validation: ValidationConfig,
}

pub type SharedState = Arc<GatewayState>;

/// The authenticated caller, attached to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
}

/// Build the Axum router with all gateway routes.
///
/// Security layers applied to the API (not `/health`):
/// - Bearer key authentication (attaches [`Principal`])
/// - In-memory rate limiting, keyed per principal
///
/// Applied to everything:
/// - Request body size limit (1 MB)
/// - CORS with restrictive origin policy
/// - HTTP trace logging
pub fn build_router(
    state: SharedState,
    rate_limiter: Arc<RateLimiter>,
    allowed_origins: &[String],
) -> Router {
    let api = Router::new()
        .route("/api/v1/ai/chat", post(api::chat_handler))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    // CORS: only allow same-origin by default; explicit origins can be configured.
    let origins: Vec<axum::http::HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(if origins.is_empty() {
            tower_http::cors::AllowOrigin::exact("http://localhost:8080".parse().unwrap())
        } else {
            tower_http::cors::AllowOrigin::list(origins)
        })
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds provider, todo store, and agent only ONCE and shares them via Arc;
/// the agent reference is handed to the router, not stored globally.
pub async fn start(
    config: taskpilot_config::AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    // === Build shared subsystems ONCE ===
    let router = taskpilot_providers::build_from_config(&config);
    let provider = router
        .default()
        .ok_or("No default provider configured — set an API key")?;

    let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());

    let mut agent = ChatAgent::new(
        provider,
        &config.default_model,
        config.default_temperature,
        store,
    )
    .with_max_tokens(config.default_max_tokens)
    .with_max_iterations(config.agent.max_tool_iterations)
    .with_max_sessions(config.agent.max_sessions)
    .with_report_actions(config.agent.report_actions);

    if let Some(prompt) = &config.agent.system_prompt_override {
        agent = agent.with_system_prompt(prompt);
    }

    let api_keys: HashMap<String, String> = config
        .gateway
        .api_keys
        .iter()
        .map(|k| (k.key.clone(), k.user.clone()))
        .collect();

    if api_keys.is_empty() {
        warn!("No gateway API keys configured — every /api request will be rejected");
    }

    let state = Arc::new(GatewayState {
        agent: Arc::new(agent),
        api_keys,
        validation: config.validation.clone(),
    });

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        std::time::Duration::from_secs(config.rate_limit.window_secs),
    ));

    let app = build_router(state, rate_limiter, &config.gateway.allowed_origins);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key (the authenticated principal).
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
pub struct RateLimiter {
    max_requests: usize,
    window: std::time::Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<std::time::Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: std::time::Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    pub fn check(&self, client_key: &str) -> bool {
        let now = std::time::Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Periodic cleanup: if map grows too large, evict stale entries
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();

        // Remove expired timestamps
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Rate limiting middleware — runs after auth, so requests are keyed by the
/// authenticated principal. Returns 429 with the standard error envelope
/// when exceeded.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, ApiError> {
    let client_key = req
        .extensions()
        .get::<Principal>()
        .map(|p| p.user_id.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    if !limiter.check(&client_key) {
        warn!(client = %client_key, "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Authentication middleware for the API.
///
/// Requires a valid `Authorization: Bearer <key>` header matching a
/// configured API key. On success the key's user id is attached to the
/// request as a [`Principal`] for the handler (and rate limiter) to consume.
async fn auth_middleware(
    State(state): State<SharedState>,
    mut req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, ApiError> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match bearer.and_then(|key| state.api_keys.get(key)) {
        Some(user_id) => {
            req.extensions_mut().insert(Principal {
                user_id: user_id.clone(),
            });
            Ok(next.run(req).await)
        }
        None => {
            warn!("Unauthorized API request — missing or invalid bearer key");
            Err(ApiError::Unauthorized)
        }
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
