use serde::{Deserialize, Serialize};

/// Session id sent to agents when the caller does not supply one
pub const DEFAULT_SESSION_ID: &str = "session456";

/// Task id sent to agents when the caller does not supply one
pub const DEFAULT_TASK_ID: &str = "task124";

/// JSON-RPC 2.0 envelope for the `tasks/send` agent convention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSendRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: TaskParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: AgentMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub part_type: String,
    pub text: String,
}

impl TaskSendRequest {
    /// Wrap a prompt in the standard envelope with the default ids
    pub fn new(text: &str) -> Self {
        Self::with_ids(text, DEFAULT_SESSION_ID, DEFAULT_TASK_ID)
    }

    /// Wrap a prompt in the standard envelope with explicit session and task ids
    pub fn with_ids(text: &str, session_id: &str, task_id: &str) -> Self {
        Self {
            jsonrpc: String::from("2.0"),
            id: task_id.to_string(),
            method: String::from("tasks/send"),
            params: TaskParams {
                session_id: Some(session_id.to_string()),
                message: AgentMessage {
                    role: String::from("user"),
                    parts: vec![MessagePart {
                        part_type: String::from("text"),
                        text: text.to_string(),
                    }],
                },
            },
        }
    }
}
