//! End-to-end integration tests for the TaskPilot todo assistant.
//!
//! These tests exercise the full pipeline from user input to reply,
//! including the agent loop, todo tool execution, and the HTTP gateway
//! with its auth / rate-limit / validation / sanitize layers.

use std::collections::HashMap;
use std::sync::Arc;

use taskpilot_agent::ChatAgent;
use taskpilot_core::error::ProviderError;
use taskpilot_core::message::{Message, MessageToolCall};
use taskpilot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use taskpilot_core::todo::TodoStore;
use taskpilot_gateway::{GatewayState, RateLimiter, build_router};
use taskpilot_todos::InMemoryTodoStore;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence.
struct ScriptedProvider {
    responses: std::sync::Mutex<Vec<ProviderResponse>>,
    call_count: std::sync::Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
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

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn tool_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: None,
        model: "mock".into(),
    }
}

fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

fn agent_with(
    provider: Arc<ScriptedProvider>,
) -> (Arc<InMemoryTodoStore>, ChatAgent) {
    let store = Arc::new(InMemoryTodoStore::new());
    let agent = ChatAgent::new(provider, "mock", 0.7, store.clone());
    (store, agent)
}

// ── E2E: Full agent pipeline ─────────────────────────────────────────────

#[tokio::test]
async fn e2e_add_todo_via_natural_language() {
    // Scenario: user says "add buy milk to my list", the model calls
    // add_todo, then confirms.
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "add_todo",
            serde_json::json!({"title": "buy milk"}),
        )]),
        text_response("Added \"buy milk\" to your list."),
    ]));
    let (store, agent) = agent_with(provider.clone());

    let reply = agent
        .process_chat("add buy milk to my list", "s1", "u1")
        .await
        .expect("Agent should succeed");

    assert_eq!(reply.reply, "Added \"buy milk\" to your list.");
    assert_eq!(reply.actions.len(), 1);
    assert!(reply.actions[0].success);
    assert_eq!(provider.calls(), 2); // tool call + final answer

    let items = store.list("u1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "buy milk");
    assert!(!items[0].done);
}

#[tokio::test]
async fn e2e_list_then_complete_flow() {
    // Seed a todo, then have the model look it up and complete it.
    let store = Arc::new(InMemoryTodoStore::new());
    let seeded = store
        .add(taskpilot_core::todo::Todo::new("u1", "walk dog"))
        .await
        .unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call("list_todos", serde_json::json!({}))]),
        tool_response(vec![make_tool_call(
            "complete_todo",
            serde_json::json!({"id": seeded.id}),
        )]),
        text_response("Done — \"walk dog\" is checked off."),
    ]));
    let agent = ChatAgent::new(provider.clone(), "mock", 0.7, store.clone());

    let reply = agent
        .process_chat("I walked the dog", "s1", "u1")
        .await
        .unwrap();

    assert_eq!(reply.reply, "Done — \"walk dog\" is checked off.");
    assert_eq!(reply.actions.len(), 2);
    assert_eq!(reply.actions[0].tool, "list_todos");
    assert_eq!(reply.actions[1].tool, "complete_todo");
    assert_eq!(provider.calls(), 3);

    assert!(store.get("u1", &seeded.id).await.unwrap().done);
}

#[tokio::test]
async fn e2e_tool_failure_feeds_back_to_model() {
    // The model tries to complete a nonexistent id; the failure is fed back
    // and it recovers with an apology instead of the turn erroring out.
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "complete_todo",
            serde_json::json!({"id": "no-such-id"}),
        )]),
        text_response("I couldn't find that todo."),
    ]));
    let (_, agent) = agent_with(provider);

    let reply = agent.process_chat("finish it", "s1", "u1").await.unwrap();
    assert_eq!(reply.reply, "I couldn't find that todo.");
    assert_eq!(reply.actions.len(), 1);
    assert!(!reply.actions[0].success);
}

// ── E2E: HTTP gateway ────────────────────────────────────────────────────

fn gateway_app(provider: Arc<ScriptedProvider>) -> (axum::Router, Arc<InMemoryTodoStore>) {
    let store = Arc::new(InMemoryTodoStore::new());
    let agent = ChatAgent::new(provider, "mock", 0.7, store.clone());

    let mut api_keys = HashMap::new();
    api_keys.insert("tk-e2e".to_string(), "u1".to_string());

    let state = Arc::new(GatewayState {
        agent: Arc::new(agent),
        api_keys,
        validation: taskpilot_config::ValidationConfig::default(),
    });
    let limiter = Arc::new(RateLimiter::new(60, std::time::Duration::from_secs(60)));
    (build_router(state, limiter, &[]), store)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is not valid JSON")
}

#[tokio::test]
async fn e2e_http_chat_round_trip() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "add_todo",
            serde_json::json!({"title": "buy milk"}),
        )]),
        text_response("Added \"buy milk\" to your list."),
    ]));
    let (app, store) = gateway_app(provider);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header("Authorization", "Bearer tk-e2e")
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"message": "add buy milk to my list", "sessionId": "s1"}"#.to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["sessionId"], "s1");
    assert_eq!(json["reply"], "Added \"buy milk\" to your list.");

    // The todo landed in the authenticated caller's store
    let items = store.list("u1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "buy milk");
}

#[tokio::test]
async fn e2e_http_rejects_unauthenticated_caller() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    let (app, _) = gateway_app(Arc::new(ScriptedProvider::new(vec![])));

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/ai/chat")
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"message": "hi", "sessionId": "s1"}"#.to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}
