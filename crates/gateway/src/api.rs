//! The AI chat API — `POST /api/v1/ai/chat`.
//!
//! The handler body trusts that auth and rate limiting already ran; it
//! validates the payload, delegates to the agent, sanitizes the reply, and
//! converts any failure into the fixed generic error envelope. No internal
//! error detail crosses this boundary — failures are logged server-side with
//! full context instead.

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use taskpilot_agent::ChatReply;
use taskpilot_config::ValidationConfig;
use tracing::error;

use crate::sanitize::sanitize_reply;
use crate::{Principal, SharedState};

// ── Request / Response types ──────────────────────────────────────────────

/// The chat request body. camelCase on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's natural-language message.
    pub message: String,

    /// Caller-chosen session identifier.
    pub session_id: String,
}

/// The uniform error envelope: `{"success": false, "error": {code, message}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Everything that can go wrong at the API boundary.
///
/// Each variant maps to one status + envelope; `Internal` deliberately
/// carries no detail, so nothing internal can leak through it.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    RateLimited,
    Validation(String),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid API key".to_string(),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests".to_string(),
            ),
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An error occurred processing your request".to_string(),
            ),
        };

        (
            status,
            Json(ErrorEnvelope {
                success: false,
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

/// Validate the chat payload against configured limits.
pub fn validate_chat_input(
    payload: &ChatRequest,
    limits: &ValidationConfig,
) -> Result<(), ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }
    if payload.message.chars().count() > limits.max_message_chars {
        return Err(ApiError::Validation(format!(
            "message exceeds {} characters",
            limits.max_message_chars
        )));
    }
    if payload.session_id.trim().is_empty() {
        return Err(ApiError::Validation("sessionId must not be empty".into()));
    }
    if payload.session_id.chars().count() > limits.max_session_id_chars {
        return Err(ApiError::Validation(format!(
            "sessionId exceeds {} characters",
            limits.max_session_id_chars
        )));
    }
    Ok(())
}

// ── Handler ───────────────────────────────────────────────────────────────

/// `POST /api/v1/ai/chat` — process natural-language input for todo
/// management.
///
/// Success: 200 with the sanitized agent reply. Any failure during agent
/// execution: 500 with the fixed generic envelope, and the underlying error
/// logged server-side.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    validate_chat_input(&payload, &state.validation)?;

    match state
        .agent
        .process_chat(
            payload.message.trim(),
            payload.session_id.trim(),
            &principal.user_id,
        )
        .await
    {
        Ok(reply) => Ok(Json(sanitize_reply(reply))),
        Err(e) => {
            error!(
                error = %e,
                session = %payload.session_id,
                user = %principal.user_id,
                "AI chat failed"
            );
            Err(ApiError::Internal)
        }
    }
}
