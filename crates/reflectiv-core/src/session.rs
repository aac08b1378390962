//! Conversation holders for front ends
//!
//! A session owns the message log and only appends to it once a turn has
//! completed, so a failed request leaves the log exactly as it was.

use tokio_util::sync::CancellationToken;

use crate::client::{ReflectivClient, RoleplayAction, RoleplayRequest};
use crate::error::ClientError;
use crate::message::{Message, Role};
use crate::reply::RoleplayReply;

/// Coach chat: the whole log goes up with every turn
pub struct ChatSession {
    client: ReflectivClient,
    messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(client: ReflectivClient) -> Self {
        Self {
            client,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Send `content` as the next user turn and return the coach's reply.
    ///
    /// Whitespace-only input is ignored and returns `Ok(None)`.
    pub async fn send_message(
        &mut self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<&Message>, ClientError> {
        if content.trim().is_empty() {
            return Ok(None);
        }

        let user = Message::user(content);
        let mut outgoing = self.messages.clone();
        outgoing.push(user.clone());

        // Nothing is committed to the log until the reply is in hand
        let reply = self.client.send_coach(&outgoing, cancel).await?;

        self.messages.push(user);
        self.messages.push(Message {
            role: Role::Assistant,
            ..reply
        });
        Ok(self.messages.last())
    }
}

/// A scripted roleplay scenario: history accumulates across start/respond/analyze turns
pub struct RoleplaySession {
    client: ReflectivClient,
    scenario_id: String,
    history: Vec<Message>,
}

impl RoleplaySession {
    pub fn new(client: ReflectivClient, scenario_id: impl Into<String>) -> Self {
        Self {
            client,
            scenario_id: scenario_id.into(),
            history: Vec::new(),
        }
    }

    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Begin (or restart) the scenario; any previous history is discarded
    pub async fn start(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<RoleplayReply, ClientError> {
        let request = RoleplayRequest::new(RoleplayAction::Start, &self.scenario_id);
        let reply = self.client.send_roleplay(&request, cancel).await?;
        self.history = reply.messages.clone();
        Ok(reply)
    }

    pub async fn respond(
        &mut self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<RoleplayReply, ClientError> {
        let request = RoleplayRequest::new(RoleplayAction::Respond, &self.scenario_id)
            .with_history(self.history.clone())
            .with_user_input(user_input);
        let reply = self.client.send_roleplay(&request, cancel).await?;

        if !user_input.is_empty() {
            self.history.push(Message::user(user_input));
        }
        self.history.extend(reply.messages.iter().cloned());
        Ok(reply)
    }

    /// Ask the worker to score the conversation so far. History is not extended.
    pub async fn analyze(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RoleplayReply, ClientError> {
        let request = RoleplayRequest::new(RoleplayAction::Analyze, &self.scenario_id)
            .with_history(self.history.clone());
        self.client.send_roleplay(&request, cancel).await
    }
}
