//! Todo trait — the todo list the agent manages on the user's behalf.
//!
//! Every store operation is scoped by owner: a todo belongs to exactly one
//! authenticated user, and lookups by another owner behave as if the todo
//! does not exist.

use crate::error::TodoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    /// Unique ID for this todo
    pub id: String,

    /// The authenticated user who owns this todo
    pub owner: String,

    /// Short title ("buy milk")
    pub title: String,

    /// Optional free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,

    /// Whether this todo is completed
    #[serde(default)]
    pub done: bool,

    /// When this todo was created
    pub created_at: DateTime<Utc>,

    /// When this todo was last modified
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Create a new open todo for the given owner.
    pub fn new(owner: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            title: title.into(),
            notes: None,
            due: None,
            done: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update to a todo. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

/// The core TodoStore trait.
///
/// Implementations: in-memory (the default). All operations are owner-scoped;
/// `get`/`update`/`complete`/`delete` for an id the owner does not hold
/// return `TodoError::NotFound`.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Add a todo. Returns the stored todo (with its generated id).
    async fn add(&self, todo: Todo) -> std::result::Result<Todo, TodoError>;

    /// List the owner's todos, open items first, newest first within a group.
    async fn list(&self, owner: &str) -> std::result::Result<Vec<Todo>, TodoError>;

    /// Get one of the owner's todos by id.
    async fn get(&self, owner: &str, id: &str) -> std::result::Result<Todo, TodoError>;

    /// Apply a partial update to one of the owner's todos.
    async fn update(
        &self,
        owner: &str,
        id: &str,
        update: TodoUpdate,
    ) -> std::result::Result<Todo, TodoError>;

    /// Mark one of the owner's todos as done.
    async fn complete(&self, owner: &str, id: &str) -> std::result::Result<Todo, TodoError>;

    /// Delete one of the owner's todos. Returns the deleted todo.
    async fn delete(&self, owner: &str, id: &str) -> std::result::Result<Todo, TodoError>;
}
