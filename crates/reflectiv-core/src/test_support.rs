//! In-process stand-in for the chat worker, shared by the async tests

use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::ReflectivClient;
use crate::config::ClientConfig;

/// Request bodies seen by a test worker, in arrival order
pub type CapturedBodies = Arc<Mutex<Vec<Value>>>;

/// Serve `router` on an ephemeral localhost port and return its base URL
pub async fn spawn_worker(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client_for(base_url: &str) -> ReflectivClient {
    let mut config = ClientConfig::new(base_url);
    config.timeout = Duration::from_secs(5);
    config.retry_delay = Duration::from_millis(10);
    ReflectivClient::new(config).unwrap()
}
