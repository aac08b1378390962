use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::message::Message;
use crate::reply::{RoleplayReply, UpstreamReply};

#[derive(Serialize)]
struct CoachRequest<'a> {
    mode: &'static str,
    agent: &'static str,
    messages: &'a [Message],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleplayPayload<'a> {
    mode: &'static str,
    action: RoleplayAction,
    scenario_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<&'a [Message]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_input: Option<&'a str>,
}

/// Which step of a roleplay scenario is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleplayAction {
    Start,
    Respond,
    Analyze,
}

impl RoleplayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleplayAction::Start => "start",
            RoleplayAction::Respond => "respond",
            RoleplayAction::Analyze => "analyze",
        }
    }
}

/// One roleplay turn. Empty history and empty user input are left off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleplayRequest {
    pub action: RoleplayAction,
    pub scenario_id: String,
    pub history: Vec<Message>,
    pub user_input: String,
}

impl RoleplayRequest {
    pub fn new(action: RoleplayAction, scenario_id: impl Into<String>) -> Self {
        Self {
            action,
            scenario_id: scenario_id.into(),
            history: Vec::new(),
            user_input: String::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_user_input(mut self, user_input: impl Into<String>) -> Self {
        self.user_input = user_input.into();
        self
    }

    fn payload(&self) -> RoleplayPayload<'_> {
        RoleplayPayload {
            mode: "roleplay",
            action: self.action,
            scenario_id: &self.scenario_id,
            history: (!self.history.is_empty()).then_some(self.history.as_slice()),
            user_input: (!self.user_input.is_empty()).then_some(self.user_input.as_str()),
        }
    }
}

/// Client for the ReflectivAI chat worker.
///
/// Holds no conversation state; every call is an independent POST to
/// `{base}/chat`. Each call is bounded by the configured timeout and can be
/// abandoned through its cancellation token.
#[derive(Clone)]
pub struct ReflectivClient {
    pub(crate) client: Client,
    pub(crate) config: ClientConfig,
    chat_url: String,
    pub(crate) status_url: String,
}

impl ReflectivClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::InvalidConfig("worker URL is empty".to_string()));
        }
        Url::parse(base)
            .map_err(|e| ClientError::InvalidConfig(format!("worker URL {:?}: {}", base, e)))?;

        let chat_url = format!("{}/chat", base);
        let status_url = format!("{}/status", base);

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ClientError::InvalidConfig(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            chat_url,
            status_url,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send the conversation so far (new user message included) and return the coach's reply
    pub async fn send_coach(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Message, ClientError> {
        let request = CoachRequest {
            mode: "coach",
            agent: "chat",
            messages,
        };

        let body = self.post_chat(&request, "coach", cancel).await?;
        let reply = UpstreamReply::classify(body)?;
        Ok(reply.into_message())
    }

    /// Send one roleplay turn and return the full reply, analysis fields included
    pub async fn send_roleplay(
        &self,
        request: &RoleplayRequest,
        cancel: &CancellationToken,
    ) -> Result<RoleplayReply, ClientError> {
        let label = format!("roleplay {}", request.action.as_str());
        let body = self.post_chat(&request.payload(), &label, cancel).await?;
        RoleplayReply::from_value(body)
    }

    async fn post_chat<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        label: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, ClientError> {
        match self.post_chat_once(payload, label, cancel).await {
            Err(e) if e.is_transient() && self.config.retry_transient => {
                warn!(request = label, error = %e, "transient failure, retrying once");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                    _ = tokio::time::sleep(self.config.retry_delay) => {}
                }
                self.post_chat_once(payload, label, cancel).await
            }
            result => result,
        }
    }

    async fn post_chat_once<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        label: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.exchange(payload, label) => result,
        }
    }

    async fn exchange<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        label: &str,
    ) -> Result<Value, ClientError> {
        let response = self.client.post(&self.chat_url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(request = label, status = status.as_u16(), body = %body, "chat worker error");
            return Err(ClientError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let text = response.text().await?;
        debug!(request = label, body = %text, "raw worker response");
        serde_json::from_str(&text)
            .map_err(|e| ClientError::MalformedResponse(format!("invalid JSON: {}", e)))
    }
}
