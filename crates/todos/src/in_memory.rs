//! In-memory todo store — the default backend.
//!
//! Todos live for the lifetime of the process; there is deliberately no
//! persistence layer behind this store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use taskpilot_core::error::TodoError;
use taskpilot_core::todo::{Todo, TodoStore, TodoUpdate};
use tokio::sync::RwLock;

/// An in-memory store keyed by owner.
pub struct InMemoryTodoStore {
    todos: RwLock<HashMap<String, Vec<Todo>>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self {
            todos: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add(&self, todo: Todo) -> Result<Todo, TodoError> {
        if todo.title.trim().is_empty() {
            return Err(TodoError::InvalidInput("title must not be empty".into()));
        }
        let mut todos = self.todos.write().await;
        todos
            .entry(todo.owner.clone())
            .or_default()
            .push(todo.clone());
        Ok(todo)
    }

    async fn list(&self, owner: &str) -> Result<Vec<Todo>, TodoError> {
        let todos = self.todos.read().await;
        let mut items = todos.get(owner).cloned().unwrap_or_default();
        // Open items first, newest first within each group
        items.sort_by(|a, b| {
            a.done
                .cmp(&b.done)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn get(&self, owner: &str, id: &str) -> Result<Todo, TodoError> {
        let todos = self.todos.read().await;
        todos
            .get(owner)
            .and_then(|items| items.iter().find(|t| t.id == id))
            .cloned()
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    async fn update(&self, owner: &str, id: &str, update: TodoUpdate) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().await;
        let item = todos
            .get_mut(owner)
            .and_then(|items| items.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(TodoError::InvalidInput("title must not be empty".into()));
            }
            item.title = title;
        }
        if let Some(notes) = update.notes {
            item.notes = Some(notes);
        }
        if let Some(due) = update.due {
            item.due = Some(due);
        }
        if let Some(done) = update.done {
            item.done = done;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn complete(&self, owner: &str, id: &str) -> Result<Todo, TodoError> {
        self.update(
            owner,
            id,
            TodoUpdate {
                done: Some(true),
                ..TodoUpdate::default()
            },
        )
        .await
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().await;
        let items = todos
            .get_mut(owner)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        let pos = items
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        Ok(items.remove(pos))
    }
}
