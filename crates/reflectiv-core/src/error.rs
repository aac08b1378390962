use thiserror::Error;

/// Errors surfaced by the chat worker client.
///
/// Callers should treat `Transport` and `Network` uniformly: both mean the
/// turn did not complete and nothing should be appended to the conversation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The worker answered with a non-2xx status.
    #[error("chat worker returned {status} {status_text}: {body}")]
    Transport {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The worker answered 2xx with a body that has no recognizable reply shape.
    #[error("malformed response from chat worker: {0}")]
    MalformedResponse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_message_includes_body() {
        let err = ClientError::Transport {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "internal error".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("internal error"));
    }

    #[test]
    fn test_only_network_errors_are_transient() {
        let err = ClientError::Transport {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            body: String::new(),
        };
        assert!(!err.is_transient());
        assert!(!ClientError::Cancelled.is_transient());
        assert!(!ClientError::MalformedResponse("[]".to_string()).is_transient());
    }
}
