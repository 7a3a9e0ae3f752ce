//! Decoding of backend reply bodies.
//!
//! Backends answer in one of two shapes: a gateway body carrying `reply`
//! (and optionally `sources`), or a chat-completions body carrying
//! `choices[0].message.content`. Anything else is a malformed body.
//!
//! A body with a `reply` field is a gateway reply whatever else it carries,
//! and a `null` source list counts as no sources.

use serde::Deserialize;

use super::BotReply;
use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletionMessage {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReplyShape {
    // Variants are tried in order, so `reply` wins over `choices`
    Gateway {
        reply: String,
        #[serde(default)]
        sources: Option<Vec<String>>,
    },
    Completions {
        choices: Vec<CompletionChoice>,
    },
}

impl ReplyShape {
    pub fn parse(body: &str) -> Result<Self, TransportError> {
        serde_json::from_str(body).map_err(|_| {
            TransportError::MalformedBody(format!(
                "expected a `reply` or `choices` body, got: {}",
                truncate(body, 200)
            ))
        })
    }

    pub fn into_reply(self) -> Result<BotReply, TransportError> {
        match self {
            ReplyShape::Completions { choices } => {
                let choice = choices.into_iter().next().ok_or_else(|| {
                    TransportError::MalformedBody("`choices` is empty".to_string())
                })?;
                Ok(BotReply {
                    text: choice.message.content,
                    sources: Vec::new(),
                })
            }
            ReplyShape::Gateway { reply, sources } => Ok(BotReply {
                text: reply,
                sources: sources.unwrap_or_default(),
            }),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<BotReply, TransportError> {
        ReplyShape::parse(body)?.into_reply()
    }

    #[test]
    fn test_completions_shape() {
        let reply = decode(r#"{"choices":[{"message":{"content":"It is a demo."}}]}"#).unwrap();
        assert_eq!(reply.text, "It is a demo.");
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_completions_shape_ignores_extra_fields() {
        let body = r#"{
            "id": "chatcmpl-custom-001",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}],
            "usage": {"total_tokens": 3}
        }"#;
        assert_eq!(decode(body).unwrap().text, "ok");
    }

    #[test]
    fn test_gateway_shape_with_sources() {
        let reply = decode(r#"{"reply":"hello","sources":["doc1.pdf","example.com"]}"#).unwrap();
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.sources, vec!["doc1.pdf", "example.com"]);
    }

    #[test]
    fn test_gateway_shape_without_sources() {
        let reply = decode(r#"{"reply":"hello"}"#).unwrap();
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_gateway_shape_with_null_sources() {
        let reply = decode(r#"{"reply":"hello","sources":null}"#).unwrap();
        assert_eq!(reply.text, "hello");
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_reply_field_wins_over_empty_choices() {
        let reply = decode(r#"{"reply":"hello","choices":[]}"#).unwrap();
        assert_eq!(reply.text, "hello");
        assert!(matches!(
            ReplyShape::parse(r#"{"reply":"hello","choices":[]}"#).unwrap(),
            ReplyShape::Gateway { .. }
        ));
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let err = decode(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[test]
    fn test_null_content_is_malformed() {
        let err = decode(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[test]
    fn test_unknown_shape_is_malformed() {
        for body in [r#"{"error":"No messages provided."}"#, "[]", "not json", ""] {
            let err = decode(body).unwrap_err();
            assert!(matches!(err, TransportError::MalformedBody(_)), "body: {}", body);
        }
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 5), "hi");
    }
}
