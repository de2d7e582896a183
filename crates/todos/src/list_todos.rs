//! list_todos tool — lists the caller's todos.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::todo::TodoStore;
use taskpilot_core::tool::{Tool, ToolResult};

pub struct ListTodosTool {
    store: Arc<dyn TodoStore>,
    owner: String,
}

impl ListTodosTool {
    pub fn new(store: Arc<dyn TodoStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Tool for ListTodosTool {
    fn name(&self) -> &str {
        "list_todos"
    }

    fn description(&self) -> &str {
        "List the user's todos. Open items come first. Use this to find a todo's id before updating, completing, or deleting it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "include_done": {
                    "type": "boolean",
                    "description": "Whether to include completed items (default: true)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let include_done = arguments["include_done"].as_bool().unwrap_or(true);

        let mut items = self
            .store
            .list(&self.owner)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "list_todos".into(),
                reason: e.to_string(),
            })?;

        if !include_done {
            items.retain(|t| !t.done);
        }

        let output = if items.is_empty() {
            "The todo list is empty.".to_string()
        } else {
            items
                .iter()
                .map(|t| {
                    let marker = if t.done { "[x]" } else { "[ ]" };
                    let due = t
                        .due
                        .map(|d| format!(" (due {})", d.format("%Y-%m-%d")))
                        .unwrap_or_default();
                    format!("{marker} {}{due} — id: {}", t.title, t.id)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::to_value(&items).unwrap_or_default()),
        })
    }
}
