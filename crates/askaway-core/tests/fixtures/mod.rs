use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock chat backend for exercising the HTTP clients
pub struct BackendMockServer {
    server: MockServer,
}

impl BackendMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// `POST /chat` answering `{"reply": ...}`
    pub async fn mock_gateway_reply(&self, reply: &str, sources: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reply": reply,
                "sources": sources,
            })))
            .mount(&self.server)
            .await;
    }

    /// `POST /llm/chat/completions` answering an OpenAI-style completion
    pub async fn mock_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/llm/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-custom-001",
                "object": "chat.completion",
                "created": 0,
                "model": "microsoft/Phi-3-mini-128k-instruct",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_raw(&self, route: &str, body: &str) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }
}

/// Nothing listens here; connections are refused immediately
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";
