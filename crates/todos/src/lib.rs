//! Todo store and agent-facing tools for TaskPilot.
//!
//! Tools give the agent the ability to act on the caller's todo list:
//! add items, list them, update, complete, and delete them. Each tool is
//! constructed already bound to `(store, owner)`, so the LLM can never
//! address another user's list.

pub mod add_todo;
pub mod complete_todo;
pub mod delete_todo;
pub mod in_memory;
pub mod list_todos;
pub mod update_todo;

use std::sync::Arc;
use taskpilot_core::todo::TodoStore;
use taskpilot_core::tool::ToolRegistry;

pub use in_memory::InMemoryTodoStore;

/// Create a tool registry with all todo tools, bound to one owner.
///
/// Built per request: the registry is cheap (five boxed tools) and binding
/// the owner here keeps the tools' argument schemas free of identity fields
/// the LLM could spoof.
pub fn registry_for(store: Arc<dyn TodoStore>, owner: &str) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(add_todo::AddTodoTool::new(store.clone(), owner)));
    registry.register(Box::new(list_todos::ListTodosTool::new(
        store.clone(),
        owner,
    )));
    registry.register(Box::new(update_todo::UpdateTodoTool::new(
        store.clone(),
        owner,
    )));
    registry.register(Box::new(complete_todo::CompleteTodoTool::new(
        store.clone(),
        owner,
    )));
    registry.register(Box::new(delete_todo::DeleteTodoTool::new(store, owner)));
    registry
}
