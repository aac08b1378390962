use serde_json::Value;
use tracing::debug;

use crate::message::{new_message_id, now_millis, Feedback, Message, Role};

/// Coerce an arbitrary upstream value into a well-formed [`Message`].
///
/// Never fails. Missing or unusable fields fall back to a fresh id, the
/// `assistant` role, and the current time. Non-string content is rendered as
/// compact JSON text, with a missing or null content becoming the JSON text of
/// an empty string.
pub fn normalize_message(raw: &Value) -> Message {
    Message {
        id: normalize_id(raw.get("id")),
        role: normalize_role(raw.get("role")),
        content: normalize_content(raw.get("content")),
        timestamp: normalize_timestamp(raw.get("timestamp")),
        feedback: normalize_feedback(raw.get("feedback")),
    }
}

fn normalize_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => new_message_id(),
    }
}

fn normalize_role(value: Option<&Value>) -> Role {
    match value.and_then(Value::as_str) {
        Some(s) => Role::parse(s).unwrap_or_else(|| {
            debug!(role = s, "unknown role from worker, treating as assistant");
            Role::Assistant
        }),
        None => Role::Assistant,
    }
}

fn normalize_content(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => Value::String(String::new()).to_string(),
        Some(other) => other.to_string(),
    }
}

fn normalize_timestamp(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or_else(now_millis),
        _ => now_millis(),
    }
}

fn normalize_feedback(value: Option<&Value>) -> Option<Feedback> {
    let value = value.filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(feedback) => Some(feedback),
        Err(e) => {
            debug!(error = %e, "dropping malformed feedback from worker");
            None
        }
    }
}
