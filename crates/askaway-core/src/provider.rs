use std::sync::Arc;
use std::time::Duration;

use crate::ai::{ChatBackend, CompletionsClient, GatewayClient};

/// Which wire variant the chat backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gateway,
    Completions,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gateway => "gateway",
            Provider::Completions => "completions",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gateway" | "chat" => Some(Provider::Gateway),
            "completions" | "openai" => Some(Provider::Completions),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Gateway, Provider::Completions]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gateway => "Chat gateway (/chat)",
            Provider::Completions => "Chat completions (/llm/chat/completions)",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        "http://localhost:8000"
    }

    /// Build the HTTP backend for this variant
    pub fn backend(
        &self,
        base_url: &str,
        model: Option<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Arc<dyn ChatBackend> {
        match self {
            Provider::Gateway => Arc::new(GatewayClient::with_timeout(base_url, timeout)),
            Provider::Completions => Arc::new(
                CompletionsClient::with_timeout(base_url, timeout)
                    .model(model)
                    .api_key(api_key),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::Completions));
        assert_eq!(Provider::from_str("Chat"), Some(Provider::Gateway));
        assert_eq!(Provider::from_str("ollama"), None);
    }

    #[test]
    fn test_backend_names_match_variant() {
        let gateway = Provider::Gateway.backend("http://localhost:8000", None, None, None);
        assert_eq!(gateway.name(), "gateway");
        let completions = Provider::Completions.backend("http://localhost:8000", None, None, None);
        assert_eq!(completions.name(), "completions");
    }
}
