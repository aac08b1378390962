//! Classification of chat worker response bodies
//!
//! The worker does not commit to one response shape. Coach replies arrive as a
//! message list, a wrapped single message, or a bare message object; roleplay
//! replies are open objects that may carry scoring alongside their messages.
//! Shapes are resolved once here and anything unrecognizable is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::message::Message;
use crate::normalize::normalize_message;

/// A coach response body, resolved to one of the shapes the worker is known to send
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// `{ "messages": [...] }`; the reply is the last element
    MessageList(Vec<Value>),
    /// `{ "message": {...} }`
    SingleMessage(Value),
    /// Any other object, taken as the message itself
    BareMessage(Map<String, Value>),
}

impl UpstreamReply {
    pub fn classify(body: Value) -> Result<Self, ClientError> {
        let mut object = match body {
            Value::Object(object) => object,
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        match object.remove("messages") {
            Some(Value::Array(messages)) if messages.is_empty() => {
                return Err(ClientError::MalformedResponse(
                    "response contained an empty messages list".to_string(),
                ));
            }
            Some(Value::Array(messages)) => return Ok(UpstreamReply::MessageList(messages)),
            Some(other) => {
                object.insert("messages".to_string(), other);
            }
            None => {}
        }

        match object.remove("message") {
            Some(message @ Value::Object(_)) => Ok(UpstreamReply::SingleMessage(message)),
            Some(other) => {
                object.insert("message".to_string(), other);
                Ok(UpstreamReply::BareMessage(object))
            }
            None => Ok(UpstreamReply::BareMessage(object)),
        }
    }

    /// Normalize the reply candidate into exactly one message
    pub fn into_message(self) -> Message {
        match self {
            UpstreamReply::MessageList(messages) => messages
                .last()
                .map(normalize_message)
                .unwrap_or_else(|| normalize_message(&Value::Null)),
            UpstreamReply::SingleMessage(message) => normalize_message(&message),
            UpstreamReply::BareMessage(object) => normalize_message(&Value::Object(object)),
        }
    }
}

/// A roleplay response: normalized messages plus any analysis fields the worker attached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleplayReply {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleplayReply {
    pub fn from_value(body: Value) -> Result<Self, ClientError> {
        let mut extra = match body {
            Value::Object(object) => object,
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let messages = match extra.remove("messages") {
            Some(Value::Array(items)) => items.iter().map(normalize_message).collect(),
            Some(other) => {
                debug!(kind = json_kind(&other), "ignoring non-list messages in roleplay reply");
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(Self { messages, extra })
    }

    /// The most recent message in this turn, if the worker sent any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use serde_json::json;

    #[test]
    fn test_message_list_takes_last_element() {
        let body = json!({
            "messages": [
                { "id": "m1", "content": "one" },
                { "id": "m2", "content": "two" },
                { "id": "m3", "content": "three" }
            ]
        });
        let reply = UpstreamReply::classify(body).unwrap();
        assert!(matches!(reply, UpstreamReply::MessageList(ref m) if m.len() == 3));

        let msg = reply.into_message();
        assert_eq!(msg.id, "m3");
        assert_eq!(msg.content, "three");
    }

    #[test]
    fn test_wrapped_single_message() {
        let body = json!({ "message": { "id": "x", "role": "assistant", "content": "hi" } });
        let msg = UpstreamReply::classify(body).unwrap().into_message();
        assert_eq!(msg.id, "x");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "hi");
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn test_bare_object_is_the_message() {
        let body = json!({ "id": "b", "content": "bare reply", "model": "worker-v2" });
        let reply = UpstreamReply::classify(body).unwrap();
        assert!(matches!(reply, UpstreamReply::BareMessage(_)));
        assert_eq!(reply.into_message().content, "bare reply");
    }

    #[test]
    fn test_non_array_messages_falls_through_to_bare() {
        let body = json!({ "messages": "oops", "content": "still here" });
        let reply = UpstreamReply::classify(body).unwrap();
        assert!(matches!(reply, UpstreamReply::BareMessage(_)));
    }

    #[test]
    fn test_null_message_falls_through_to_bare() {
        let body = json!({ "message": null, "content": "fallback" });
        let msg = UpstreamReply::classify(body).unwrap().into_message();
        assert_eq!(msg.content, "fallback");
    }

    #[test]
    fn test_non_object_bodies_are_rejected() {
        for body in [json!([]), json!("hi"), json!(3), json!(null)] {
            let err = UpstreamReply::classify(body).unwrap_err();
            assert!(matches!(err, ClientError::MalformedResponse(_)));
        }
    }

    #[test]
    fn test_empty_message_list_is_rejected() {
        let err = UpstreamReply::classify(json!({ "messages": [] })).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn test_roleplay_reply_normalizes_every_message() {
        let body = json!({
            "messages": [
                { "role": "assistant", "content": "Dr. Patel: I only have five minutes." },
                { "content": { "cue": "arms crossed" } }
            ],
            "score": 72,
            "analysis": { "strengths": ["concise opener"] }
        });
        let reply = RoleplayReply::from_value(body).unwrap();
        assert_eq!(reply.messages.len(), 2);
        assert_eq!(reply.messages[1].role, Role::Assistant);
        assert_eq!(reply.messages[1].content, r#"{"cue":"arms crossed"}"#);
        assert_eq!(reply.extra["score"], json!(72));
        assert!(reply.extra.contains_key("analysis"));
        assert!(!reply.extra.contains_key("messages"));
    }

    #[test]
    fn test_roleplay_reply_without_messages() {
        let reply = RoleplayReply::from_value(json!({ "summary": "Well handled" })).unwrap();
        assert!(reply.messages.is_empty());
        assert!(reply.last_message().is_none());
        assert_eq!(reply.extra["summary"], json!("Well handled"));
    }

    #[test]
    fn test_roleplay_reply_serializes_flat() {
        let reply = RoleplayReply::from_value(json!({
            "messages": [{ "id": "r1", "content": "Hello", "timestamp": 10 }],
            "score": 5
        }))
        .unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["score"], json!(5));
        assert_eq!(value["messages"][0]["id"], json!("r1"));
    }

    #[test]
    fn test_roleplay_reply_rejects_arrays() {
        assert!(RoleplayReply::from_value(json!([1])).is_err());
    }
}
