use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{http_client, read_reply, BotReply, ChatBackend, ChatRequest};
use crate::error::TransportError;

#[derive(Serialize)]
struct GatewayRequest<'a> {
    message: &'a str,
}

/// Client for backends exposing `POST /chat` with `{"message"}` in and
/// `{"reply"}` out.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for GatewayClient {
    async fn send(&self, request: &ChatRequest) -> Result<BotReply, TransportError> {
        let url = format!("{}/chat", self.base_url);
        tracing::debug!(%url, "Sending chat message to gateway");

        let response = self
            .client
            .post(&url)
            .json(&GatewayRequest {
                message: &request.message,
            })
            .send()
            .await?;

        read_reply(response).await
    }

    fn name(&self) -> &str {
        "gateway"
    }
}
