//! The agent's reply shape — what a successful chat turn returns.

use serde::{Deserialize, Serialize};

/// The result of one chat turn.
///
/// This is the payload the gateway sanitizes and returns with HTTP 200.
/// Field names are camelCase on the wire, matching the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Always true — failures surface as `Err`, never as a reply.
    pub success: bool,

    /// The session this turn belongs to (caller-supplied id).
    pub session_id: String,

    /// The assistant's natural-language reply.
    pub reply: String,

    /// Todo operations performed during this turn, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSummary>,
}

/// One todo operation the agent performed during a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSummary {
    /// The tool that ran (e.g., "add_todo").
    pub tool: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Human-readable outcome ("Created todo \"buy milk\" …").
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_serialization_skips_empty_actions() {
        let reply = ChatReply {
            success: true,
            session_id: "s1".into(),
            reply: "Done!".into(),
            actions: vec![],
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"sessionId\":\"s1\""));
        assert!(!json.contains("actions"));
    }

    #[test]
    fn reply_with_actions_roundtrips() {
        let reply = ChatReply {
            success: true,
            session_id: "s1".into(),
            reply: "Added it.".into(),
            actions: vec![ActionSummary {
                tool: "add_todo".into(),
                success: true,
                detail: "Created todo \"buy milk\"".into(),
            }],
        };
        let json = serde_json::to_string(&reply).unwrap();
        let parsed: ChatReply = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.actions.len(), 1);
        assert_eq!(parsed.actions[0].tool, "add_todo");
    }
}
