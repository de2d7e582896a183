//! Shared test doubles and helpers for gateway tests.

use crate::{GatewayState, SharedState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use std::collections::HashMap;
use std::sync::Arc;
use taskpilot_agent::ChatAgent;
use taskpilot_core::error::ProviderError;
use taskpilot_core::message::{Message, MessageToolCall};
use taskpilot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use taskpilot_todos::InMemoryTodoStore;

/// The exact failure body the API promises for internal errors.
pub const FIXED_ERROR_BODY: &str = r#"{"success": false, "error": {"code": "INTERNAL_ERROR", "message": "An error occurred processing your request"}}"#;

/// A provider that returns scripted responses in sequence.
pub struct ScriptedProvider {
    responses: std::sync::Mutex<Vec<ProviderResponse>>,
    call_count: std::sync::Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        if *count >= responses.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                *count,
                responses.len()
            );
        }
        let resp = responses[*count].clone();
        *count += 1;
        Ok(resp)
    }
}

/// A provider that always fails with the given message.
pub struct FailingProvider {
    message: String,
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Timeout(self.message.clone()))
    }
}

pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: None,
        model: "mock".into(),
    }
}

pub fn tool_response(name: &str, args: serde_json::Value) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }];
    ProviderResponse {
        message: msg,
        usage: None,
        model: "mock".into(),
    }
}

fn state_with_provider(provider: Arc<dyn Provider>) -> (SharedState, Arc<InMemoryTodoStore>) {
    let store = Arc::new(InMemoryTodoStore::new());
    let agent = ChatAgent::new(provider, "mock", 0.7, store.clone());

    let mut api_keys = HashMap::new();
    api_keys.insert("tk-test".to_string(), "u1".to_string());

    let state = Arc::new(GatewayState {
        agent: Arc::new(agent),
        api_keys,
        validation: taskpilot_config::ValidationConfig::default(),
    });
    (state, store)
}

/// Gateway state with a scripted provider and one API key, `tk-test` → `u1`.
pub fn scripted_state(
    responses: Vec<ProviderResponse>,
) -> (SharedState, Arc<InMemoryTodoStore>) {
    state_with_provider(Arc::new(ScriptedProvider::new(responses)))
}

/// Gateway state whose provider always fails with `message`.
pub fn failing_state(message: &str) -> SharedState {
    state_with_provider(Arc::new(FailingProvider {
        message: message.to_string(),
    }))
    .0
}

/// An authorized chat request for `tk-test`.
pub fn chat_request(message: &str, session_id: &str) -> Request<Body> {
    let body = serde_json::json!({ "message": message, "sessionId": session_id });
    Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header("Authorization", "Bearer tk-test")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as a string.
pub async fn body_string(response: axum::response::Response) -> String {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("response body is not valid JSON")
}
