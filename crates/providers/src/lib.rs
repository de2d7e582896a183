//! LLM provider implementations for TaskPilot.
//!
//! One concrete backend — the OpenAI-compatible chat-completions protocol —
//! covers OpenAI, OpenRouter, Ollama, and most hosted endpoints. The router
//! builds providers from configuration once at startup; the rest of the
//! system only sees `Arc<dyn Provider>`.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
