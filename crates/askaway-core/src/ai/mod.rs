pub mod completions;
pub mod gateway;
pub mod reply;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::TransportError;
use crate::state::ChatMessage;

pub use completions::CompletionsClient;
pub use gateway::GatewayClient;
pub use reply::ReplyShape;

/// What the session hands to a backend for one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    /// Completed turns before `message`, oldest first
    pub transcript: Vec<ChatMessage>,
}

/// A successfully decoded backend reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub sources: Vec<String>,
}

/// One request/reply exchange with a chat backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<BotReply, TransportError>;

    /// Short label for logs and the status line
    fn name(&self) -> &str;
}

pub(crate) fn http_client(timeout: Option<Duration>) -> Client {
    let Some(timeout) = timeout else {
        return Client::new();
    };
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::warn!("Could not apply request timeout, using defaults: {}", e);
        Client::new()
    })
}

/// Turn an HTTP response into a reply, treating non-2xx and bad bodies as failures
pub(crate) async fn read_reply(response: reqwest::Response) -> Result<BotReply, TransportError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    ReplyShape::parse(&body)?.into_reply()
}
