//! update_todo tool — patches fields of an existing todo.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::todo::{TodoStore, TodoUpdate};
use taskpilot_core::tool::{Tool, ToolResult};

use crate::add_todo::parse_due;

pub struct UpdateTodoTool {
    store: Arc<dyn TodoStore>,
    owner: String,
}

impl UpdateTodoTool {
    pub fn new(store: Arc<dyn TodoStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Tool for UpdateTodoTool {
    fn name(&self) -> &str {
        "update_todo"
    }

    fn description(&self) -> &str {
        "Change the title, notes, due date, or done state of an existing todo. Requires the todo's id from list_todos."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "The todo's id"
                },
                "title": { "type": "string" },
                "notes": { "type": "string" },
                "due": {
                    "type": "string",
                    "description": "RFC 3339 or YYYY-MM-DD"
                },
                "done": { "type": "boolean" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let id = arguments["id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'id' argument".into()))?;

        let update = TodoUpdate {
            title: arguments["title"].as_str().map(String::from),
            notes: arguments["notes"].as_str().map(String::from),
            due: match arguments["due"].as_str() {
                Some(s) => Some(parse_due(s)?),
                None => None,
            },
            done: arguments["done"].as_bool(),
        };

        match self.store.update(&self.owner, id, update).await {
            Ok(updated) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Updated todo \"{}\" (id: {})", updated.title, updated.id),
                data: Some(serde_json::to_value(&updated).unwrap_or_default()),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Could not update todo: {e}"),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryTodoStore;
    use taskpilot_core::todo::Todo;

    #[tokio::test]
    async fn updates_title() {
        let store = Arc::new(InMemoryTodoStore::new());
        let todo = store.add(Todo::new("u1", "buy milk")).await.unwrap();

        let tool = UpdateTodoTool::new(store.clone(), "u1");
        let result = tool
            .execute(serde_json::json!({"id": todo.id, "title": "buy oat milk"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            store.get("u1", &todo.id).await.unwrap().title,
            "buy oat milk"
        );
    }

    #[tokio::test]
    async fn unknown_id_reports_failure_to_llm() {
        let store = Arc::new(InMemoryTodoStore::new());
        let tool = UpdateTodoTool::new(store, "u1");

        // Store-level misses are reported as unsuccessful results, not
        // errors, so the model can recover (e.g. call list_todos again).
        let result = tool
            .execute(serde_json::json!({"id": "nope", "title": "x"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not found"));
    }
}
