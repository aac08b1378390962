//! UI-agnostic conversation types
//!
//! These are the canonical records exchanged between the chat worker client and
//! whatever front end renders the conversation (CLI, desktop shell, etc.).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single message in a coaching or roleplay conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Creation instant in milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Message {
    /// Build a locally authored message with a fresh id and the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            timestamp: now_millis(),
            feedback: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The speaker of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// Coaching annotation attached to assistant replies when the worker scored the turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

pub(crate) fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), json!("assistant"));
        assert_eq!(serde_json::to_value(Role::System).unwrap(), json!("system"));
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("narrator"), None);
    }

    #[test]
    fn test_user_message_has_id_and_timestamp() {
        let msg = Message::user("How do I open with a skeptical HCP?");
        assert!(!msg.id.is_empty());
        assert!(msg.timestamp > 0);
        assert_eq!(msg.role, Role::User);
        assert!(msg.feedback.is_none());
    }

    #[test]
    fn test_local_ids_are_unique() {
        assert_ne!(Message::user("a").id, Message::user("a").id);
    }

    #[test]
    fn test_feedback_wire_shape() {
        let mut msg = Message::assistant("Try mirroring their concern.");
        msg.feedback = Some(Feedback {
            eq_score: Some(4.5),
            frameworks: vec!["Active Listening".to_string()],
            suggestions: Vec::new(),
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["feedback"]["eqScore"], json!(4.5));
        assert_eq!(value["feedback"]["frameworks"], json!(["Active Listening"]));
        assert!(value["feedback"].get("suggestions").is_none());
    }

    #[test]
    fn test_absent_feedback_is_omitted() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(value.get("feedback").is_none());
    }
}
