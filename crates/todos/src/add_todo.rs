//! add_todo tool — creates a todo on the caller's list.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::todo::{Todo, TodoStore};
use taskpilot_core::tool::{Tool, ToolResult};

pub struct AddTodoTool {
    store: Arc<dyn TodoStore>,
    owner: String,
}

impl AddTodoTool {
    pub fn new(store: Arc<dyn TodoStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Tool for AddTodoTool {
    fn name(&self) -> &str {
        "add_todo"
    }

    fn description(&self) -> &str {
        "Add a new item to the user's todo list. Use when the user wants to remember or do something."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Short title of the todo, e.g. 'buy milk'"
                },
                "notes": {
                    "type": "string",
                    "description": "Optional free-form notes"
                },
                "due": {
                    "type": "string",
                    "description": "Optional due date, RFC 3339 or YYYY-MM-DD"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let title = arguments["title"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'title' argument".into()))?;

        let mut todo = Todo::new(&self.owner, title);
        if let Some(notes) = arguments["notes"].as_str() {
            todo.notes = Some(notes.to_string());
        }
        if let Some(due) = arguments["due"].as_str() {
            todo.due = Some(parse_due(due)?);
        }

        match self.store.add(todo).await {
            Ok(created) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Created todo \"{}\" (id: {})", created.title, created.id),
                data: Some(serde_json::to_value(&created).unwrap_or_default()),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Could not create todo: {e}"),
                data: None,
            }),
        }
    }
}

/// Parse a due date from RFC 3339 or a bare `YYYY-MM-DD` (end of day UTC).
pub(crate) fn parse_due(s: &str) -> Result<DateTime<Utc>, ToolError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let end_of_day = date.and_hms_opt(23, 59, 59).unwrap_or_default();
        return Ok(DateTime::from_naive_utc_and_offset(end_of_day, Utc));
    }
    Err(ToolError::InvalidArguments(format!(
        "Unparseable due date: '{s}' (expected RFC 3339 or YYYY-MM-DD)"
    )))
}
