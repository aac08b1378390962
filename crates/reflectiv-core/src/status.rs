//! Liveness check for the chat worker

use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::client::ReflectivClient;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Offline,
}

/// Result of one status check. Latency is zero when the worker could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: ServiceState,
    pub latency_ms: u64,
}

impl StatusReport {
    pub fn offline() -> Self {
        Self {
            state: ServiceState::Offline,
            latency_ms: 0,
        }
    }

    pub fn is_online(&self) -> bool {
        self.state == ServiceState::Online
    }
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

impl ReflectivClient {
    /// GET `{base}/status` and report whether the worker says it is healthy
    pub async fn check_status(&self) -> StatusReport {
        let started = Instant::now();
        match self.fetch_status().await {
            Ok(status) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                let state = if status == "ok" {
                    ServiceState::Online
                } else {
                    ServiceState::Offline
                };
                StatusReport { state, latency_ms }
            }
            Err(e) => {
                debug!(error = %e, url = %self.status_url, "status check failed");
                StatusReport::offline()
            }
        }
    }

    /// Check immediately, then again every `interval` after the previous check finishes
    pub fn watch_status(&self, interval: Duration) -> impl Stream<Item = StatusReport> + '_ {
        stream::unfold(true, move |first| async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            Some((self.check_status().await, false))
        })
    }

    async fn fetch_status(&self) -> Result<String, ClientError> {
        let response = self.client.get(&self.status_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: StatusBody = response.json().await?;
        Ok(body.status)
    }
}
