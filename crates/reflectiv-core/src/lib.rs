pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod normalize;
pub mod reply;
pub mod session;
pub mod status;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use client::{ReflectivClient, RoleplayAction, RoleplayRequest};
pub use config::{ClientConfig, Config, DEFAULT_WORKER_URL, WORKER_URL_ENV};
pub use error::ClientError;
pub use message::{Feedback, Message, Role};
pub use normalize::normalize_message;
pub use reply::{RoleplayReply, UpstreamReply};
pub use session::{ChatSession, RoleplaySession};
pub use status::{ServiceState, StatusReport};
