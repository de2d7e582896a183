//! The chat agent loop implementation.

use crate::reply::{ActionSummary, ChatReply};
use std::collections::HashMap;
use std::sync::Arc;
use taskpilot_core::error::Error;
use taskpilot_core::message::{ChatSession, Message, SessionId};
use taskpilot_core::provider::{Provider, ProviderRequest};
use taskpilot_core::todo::TodoStore;
use taskpilot_core::tool::ToolCall;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default system prompt for the todo assistant.
const SYSTEM_PROMPT: &str = "You are TaskPilot, a todo assistant. You manage the user's todo list \
through the provided tools: add_todo, list_todos, update_todo, complete_todo, delete_todo. \
When the user asks for anything involving their todos, call the appropriate tool rather than \
answering from memory. Look up ids with list_todos before updating, completing, or deleting. \
After acting, confirm what you did in one or two plain sentences.";

/// The chat agent: per-session history plus the provider/tool loop.
///
/// One instance is built at process startup and shared (`Arc`) by every
/// request; all per-request state lives on the stack or in the session map.
pub struct ChatAgent {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// The todo store tools are bound to, per caller
    store: Arc<dyn TodoStore>,

    /// Override for the built-in system prompt
    system_prompt_override: Option<String>,

    /// Maximum provider/tool iterations per turn
    max_iterations: u32,

    /// Maximum in-memory sessions before oldest are evicted
    max_sessions: usize,

    /// Whether replies carry per-turn action summaries
    report_actions: bool,

    /// Sessions keyed by (user id, session id)
    sessions: RwLock<HashMap<(String, String), ChatSession>>,
}

impl ChatAgent {
    /// Create a new chat agent.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        store: Arc<dyn TodoStore>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            store,
            system_prompt_override: None,
            max_iterations: 8,
            max_sessions: 1_000,
            report_actions: true,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Override the built-in system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt_override = Some(prompt.into());
        self
    }

    /// Set the maximum number of provider/tool iterations per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the maximum number of in-memory sessions.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Enable or disable per-turn action summaries in replies.
    pub fn with_report_actions(mut self, enabled: bool) -> Self {
        self.report_actions = enabled;
        self
    }

    /// Build the system prompt for a turn.
    fn system_prompt(&self) -> String {
        let base = self
            .system_prompt_override
            .as_deref()
            .unwrap_or(SYSTEM_PROMPT);
        format!(
            "{base}\n\nToday's date is {}.",
            chrono::Utc::now().format("%Y-%m-%d")
        )
    }

    /// Process one chat message for the given session and user.
    ///
    /// This is the delegate the HTTP route calls. It:
    /// 1. Loads (or creates) the `(user_id, session_id)` session
    /// 2. Calls the LLM with the session history and the todo tools
    /// 3. Executes requested tool calls against the caller's store and loops
    /// 4. Returns the final text reply plus a summary of actions taken
    pub async fn process_chat(
        &self,
        message: &str,
        session_id: &str,
        user_id: &str,
    ) -> Result<ChatReply, Error> {
        info!(session = %session_id, user = %user_id, "Processing chat message");

        let key = (user_id.to_string(), session_id.to_string());

        // Snapshot the session history; the lock is never held across an
        // await of the provider, so concurrent sessions proceed independently.
        let mut messages = {
            let mut sessions = self.sessions.write().await;

            // Evict the oldest session when at capacity
            if sessions.len() >= self.max_sessions && !sessions.contains_key(&key) {
                if let Some(oldest_key) = sessions
                    .iter()
                    .min_by_key(|(_, s)| s.created_at)
                    .map(|(k, _)| k.clone())
                {
                    warn!(user = %oldest_key.0, session = %oldest_key.1, "Evicting oldest session");
                    sessions.remove(&oldest_key);
                }
            }

            let session = sessions
                .entry(key.clone())
                .or_insert_with(|| ChatSession::new(SessionId::from(session_id), user_id));
            session.push(Message::user(message));
            session.messages.clone()
        };
        let turn_start = messages.len();

        // Tools bound to this caller's list
        let tools = taskpilot_todos::registry_for(self.store.clone(), user_id);
        let tool_definitions = tools.definitions();

        let mut actions: Vec<ActionSummary> = Vec::new();
        let mut iteration = 0;
        let reply_text = loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(Error::Internal(format!(
                    "Tool iteration limit ({}) reached for session {session_id}",
                    self.max_iterations
                )));
            }

            let mut request_messages = vec![Message::system(self.system_prompt())];
            request_messages.extend(messages.iter().cloned());

            let response = self
                .provider
                .complete(ProviderRequest {
                    model: self.model.clone(),
                    messages: request_messages,
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                    tools: tool_definitions.clone(),
                })
                .await?;

            if let Some(usage) = &response.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Provider usage"
                );
            }

            let assistant_message = response.message;
            let tool_calls = assistant_message.tool_calls.clone();
            messages.push(assistant_message.clone());

            if tool_calls.is_empty() {
                break assistant_message.content;
            }

            for call in tool_calls {
                let arguments: serde_json::Value = match serde_json::from_str(&call.arguments) {
                    Ok(v) => v,
                    Err(e) => {
                        // Feed the parse failure back to the model so it can retry
                        warn!(tool = %call.name, error = %e, "Malformed tool arguments");
                        messages.push(Message::tool_result(
                            &call.id,
                            format!("Invalid arguments: {e}"),
                        ));
                        continue;
                    }
                };

                let result = tools
                    .execute(&ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments,
                    })
                    .await;

                match result {
                    Ok(result) => {
                        debug!(tool = %call.name, success = result.success, "Tool executed");
                        actions.push(ActionSummary {
                            tool: call.name.clone(),
                            success: result.success,
                            detail: result.output.clone(),
                        });
                        messages.push(Message::tool_result(&call.id, result.output));
                    }
                    Err(e) => {
                        // Tool failures don't abort the turn; the model sees
                        // the error text and can recover or apologize.
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        actions.push(ActionSummary {
                            tool: call.name.clone(),
                            success: false,
                            detail: e.to_string(),
                        });
                        messages.push(Message::tool_result(&call.id, format!("Error: {e}")));
                    }
                }
            }
        };

        // Write the turn's new messages back to the session
        {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(&key) {
                for msg in messages.drain(turn_start..) {
                    session.push(msg);
                }
            }
        }

        Ok(ChatReply {
            success: true,
            session_id: session_id.to_string(),
            reply: reply_text,
            actions: if self.report_actions { actions } else { vec![] },
        })
    }

    /// Number of sessions currently held in memory.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
