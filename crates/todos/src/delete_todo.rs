//! delete_todo tool — removes a todo from the caller's list.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::todo::TodoStore;
use taskpilot_core::tool::{Tool, ToolResult};

pub struct DeleteTodoTool {
    store: Arc<dyn TodoStore>,
    owner: String,
}

impl DeleteTodoTool {
    pub fn new(store: Arc<dyn TodoStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Tool for DeleteTodoTool {
    fn name(&self) -> &str {
        "delete_todo"
    }

    fn description(&self) -> &str {
        "Delete a todo permanently. Requires the todo's id from list_todos. Prefer complete_todo unless the user explicitly wants the item gone."
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

        match self.store.delete(&self.owner, id).await {
            Ok(todo) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Deleted \"{}\"", todo.title),
                data: Some(serde_json::to_value(&todo).unwrap_or_default()),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Could not delete todo: {e}"),
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
    async fn deletes_existing_todo() {
        let store = Arc::new(InMemoryTodoStore::new());
        let todo = store.add(Todo::new("u1", "buy milk")).await.unwrap();

        let tool = DeleteTodoTool::new(store.clone(), "u1");
        let result = tool
            .execute(serde_json::json!({"id": todo.id}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(store.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_invalid_arguments() {
        let store = Arc::new(InMemoryTodoStore::new());
        let tool = DeleteTodoTool::new(store, "u1");
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
