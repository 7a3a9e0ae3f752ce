use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, read_reply, BotReply, ChatBackend, ChatRequest};
use crate::error::TransportError;
use crate::state::{ChatMessage, ChatRole};

#[derive(Serialize)]
struct CompletionsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

/// Client for OpenAI-style backends mounted under `/llm`
#[derive(Clone)]
pub struct CompletionsClient {
    client: Client,
    base_url: String,
    model: Option<String>,
    api_key: Option<String>,
}

impl CompletionsClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: None,
            api_key: None,
        }
    }

    pub fn model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>, TransportError> {
        let url = format!("{}/llm/models", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let models: ModelsResponse = response.json().await?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl ChatBackend for CompletionsClient {
    async fn send(&self, request: &ChatRequest) -> Result<BotReply, TransportError> {
        let url = format!("{}/llm/chat/completions", self.base_url);

        let mut messages = request.transcript.clone();
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: request.message.clone(),
        });
        tracing::debug!(%url, turns = messages.len(), "Sending chat completion request");

        let body = CompletionsRequest {
            model: self.model.as_deref(),
            messages,
        };

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        read_reply(response).await
    }

    fn name(&self) -> &str {
        "completions"
    }
}
