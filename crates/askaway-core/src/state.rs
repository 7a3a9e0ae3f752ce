//! UI-agnostic chat state types
//!
//! These records are shared by every front end (the terminal UI, the one-shot
//! CLI) and by the history store. None of them depend on a UI framework.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in place of a reply when the backend call fails
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Greeting record used by sessions that open with a bot message
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// One record of the live session.
///
/// A record is exactly one of: a user query (`is_user`), a bot reply
/// (`response` set), a loading placeholder (`loading`), or a failed reply
/// (`error`, with the fallback text as `response`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: String,
    pub query: String,
    pub response: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub timestamp: String,
    pub is_user: bool,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub error: bool,
}

impl Exchange {
    pub fn user(query: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            response: None,
            sources: Vec::new(),
            timestamp: now_timestamp(),
            is_user: true,
            loading: false,
            error: false,
        }
    }

    pub fn loading(query: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            response: None,
            sources: Vec::new(),
            timestamp: now_timestamp(),
            is_user: false,
            loading: true,
            error: false,
        }
    }

    pub fn bot(query: impl Into<String>, response: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            response: Some(response.into()),
            sources,
            timestamp: now_timestamp(),
            is_user: false,
            loading: false,
            error: false,
        }
    }

    pub fn failed(query: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            response: Some(FALLBACK_REPLY.to_string()),
            sources: Vec::new(),
            timestamp: now_timestamp(),
            is_user: false,
            loading: false,
            error: true,
        }
    }

    pub fn is_bot_reply(&self) -> bool {
        !self.is_user && !self.loading && !self.error && self.response.is_some()
    }

    /// Display text: the query for user records, the response otherwise
    pub fn text(&self) -> &str {
        if self.is_user {
            &self.query
        } else {
            self.response.as_deref().unwrap_or("")
        }
    }
}

/// Durable record of a past exchange, as persisted in the history slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub query: String,
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub timestamp: String,
}

impl HistoryEntry {
    /// Build the durable form of a completed bot reply
    pub fn from_reply(reply: &Exchange) -> Option<Self> {
        if !reply.is_bot_reply() {
            return None;
        }
        Some(Self {
            id: reply.id.clone(),
            query: reply.query.clone(),
            response: reply.response.clone().unwrap_or_default(),
            sources: reply.sources.clone(),
            timestamp: reply.timestamp.clone(),
        })
    }
}

/// A chat message in the transcript sent to message-list backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_serializes_camel_case() {
        let exchange = Exchange::user("What is AskAway?");
        let json = serde_json::to_value(&exchange).unwrap();
        assert_eq!(json["isUser"], true);
        assert_eq!(json["query"], "What is AskAway?");
        assert!(json["response"].is_null());
    }

    #[test]
    fn test_failed_exchange_carries_fallback() {
        let failed = Exchange::failed("test");
        assert!(failed.error);
        assert!(!failed.loading);
        assert_eq!(failed.response.as_deref(), Some(FALLBACK_REPLY));
        assert!(!failed.is_bot_reply());
    }

    #[test]
    fn test_history_entry_only_from_successful_reply() {
        let reply = Exchange::bot("q", "a", vec!["doc1.pdf".to_string()]);
        let entry = HistoryEntry::from_reply(&reply).unwrap();
        assert_eq!(entry.id, reply.id);
        assert_eq!(entry.response, "a");
        assert_eq!(entry.sources, vec!["doc1.pdf".to_string()]);

        assert!(HistoryEntry::from_reply(&Exchange::user("q")).is_none());
        assert!(HistoryEntry::from_reply(&Exchange::loading("q")).is_none());
        assert!(HistoryEntry::from_reply(&Exchange::failed("q")).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Exchange::user("same");
        let b = Exchange::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_chat_role_wire_names() {
        let msg = ChatMessage { role: ChatRole::Assistant, content: "hi".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
