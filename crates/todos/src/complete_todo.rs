//! complete_todo tool — marks a todo as done.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::todo::TodoStore;
use taskpilot_core::tool::{Tool, ToolResult};

pub struct CompleteTodoTool {
    store: Arc<dyn TodoStore>,
    owner: String,
}

impl CompleteTodoTool {
    pub fn new(store: Arc<dyn TodoStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Tool for CompleteTodoTool {
    fn name(&self) -> &str {
        "complete_todo"
    }

    fn description(&self) -> &str {
        "Mark a todo as done. Requires the todo's id from list_todos."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "The todo's id"
                }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let id = arguments["id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'id' argument".into()))?;

        match self.store.complete(&self.owner, id).await {
            Ok(todo) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Completed \"{}\"", todo.title),
                data: Some(serde_json::to_value(&todo).unwrap_or_default()),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Could not complete todo: {e}"),
                data: None,
            }),
        }
    }
}
