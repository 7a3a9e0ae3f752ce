//! The chat session controller.
//!
//! Owns the live list of exchanges and the in-memory history list, talks to
//! the backend, and writes history through the `HistoryStore` after every
//! change that must survive a restart.
//!
//! Sending is split in two halves so a UI can keep drawing while the backend
//! call runs elsewhere: `begin_send` records the user message and the loading
//! placeholder, `finish_send` swaps the placeholder for the outcome. The
//! `PendingSend` token between them is consumed, so each placeholder is
//! resolved exactly once. `send_message` runs both halves around the call.

use std::sync::Arc;

use crate::ai::{BotReply, ChatBackend, ChatRequest};
use crate::error::{ChatError, TransportError};
use crate::history::HistoryStore;
use crate::state::{ChatMessage, ChatRole, Exchange, HistoryEntry};

/// An outstanding send, returned by `begin_send` and consumed by `finish_send`
#[derive(Debug)]
#[must_use = "a pending send must be passed to finish_send to clear its placeholder"]
pub struct PendingSend {
    placeholder_id: String,
    request: ChatRequest,
}

impl PendingSend {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    store: HistoryStore,
    exchanges: Vec<Exchange>,
    history: Vec<HistoryEntry>,
    pending: Option<String>,
    started: bool,
}

impl ChatSession {
    /// Start an empty session, loading history from the store
    pub fn new(backend: Arc<dyn ChatBackend>, store: HistoryStore) -> Self {
        let history = store.load();
        Self {
            backend,
            store,
            exchanges: Vec::new(),
            history,
            pending: None,
            started: false,
        }
    }

    /// Open the session with a bot greeting. The greeting does not mark the
    /// session as started and is never written to history.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.exchanges.push(Exchange::bot("", greeting, Vec::new()));
        self
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Past exchanges, newest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Validate `text`, record it, and add the loading placeholder.
    ///
    /// Nothing changes when the trimmed text is empty or another send is
    /// still outstanding.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend, ChatError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.pending.is_some() {
            return Err(ChatError::Busy);
        }

        let request = ChatRequest {
            message: message.to_string(),
            transcript: self.transcript(),
        };

        self.exchanges.push(Exchange::user(message));
        let placeholder = Exchange::loading(message);
        let placeholder_id = placeholder.id.clone();
        self.exchanges.push(placeholder);
        self.pending = Some(placeholder_id.clone());
        self.started = true;

        tracing::info!(backend = self.backend.name(), chars = message.len(), "Sending chat message");

        Ok(PendingSend {
            placeholder_id,
            request,
        })
    }

    /// Replace the placeholder with the reply, or with an error record when
    /// the call failed. Returns the appended record.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<BotReply, TransportError>,
    ) -> &Exchange {
        if let Some(pos) = self.exchanges.iter().position(|e| e.id == pending.placeholder_id) {
            self.exchanges.remove(pos);
        }
        if self.pending.as_deref() == Some(pending.placeholder_id.as_str()) {
            self.pending = None;
        }

        let query = pending.request.message;
        let exchange = match result {
            Ok(reply) => {
                tracing::info!(sources = reply.sources.len(), "Received chat reply");
                let exchange = Exchange::bot(query, reply.text, reply.sources);
                if let Some(entry) = HistoryEntry::from_reply(&exchange) {
                    self.history.insert(0, entry);
                    self.persist_history();
                }
                exchange
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), "Chat request failed: {}", e);
                Exchange::failed(query)
            }
        };

        self.exchanges.push(exchange);
        &self.exchanges[self.exchanges.len() - 1]
    }

    /// Send one message and wait for the outcome.
    ///
    /// Transport failures are not errors here: they come back as an error
    /// record. `Err` means the message was refused and nothing was sent.
    pub async fn send_message(&mut self, text: &str) -> Result<&Exchange, ChatError> {
        let pending = self.begin_send(text)?;
        let backend = self.backend();
        let result = backend.send(pending.request()).await;
        Ok(self.finish_send(pending, result))
    }

    /// Show a past exchange as the whole session, without contacting the backend
    pub fn select_history_entry(&mut self, entry: &HistoryEntry) -> Result<(), ChatError> {
        if self.pending.is_some() {
            return Err(ChatError::Busy);
        }

        let user = Exchange::user(entry.query.clone());
        let mut reply = Exchange::bot(entry.query.clone(), entry.response.clone(), entry.sources.clone());
        reply.timestamp = entry.timestamp.clone();

        self.exchanges = vec![user, reply];
        self.started = true;
        Ok(())
    }

    /// Empty the history and drop its persisted slot
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to remove persisted history: {}", e);
        }
    }

    /// Start over with an empty session; history is kept
    pub fn new_chat(&mut self) -> Result<(), ChatError> {
        if self.pending.is_some() {
            return Err(ChatError::Busy);
        }
        self.exchanges.clear();
        self.started = false;
        Ok(())
    }

    fn persist_history(&self) {
        if let Err(e) = self.store.save(&self.history) {
            tracing::warn!("Failed to persist history: {}", e);
        }
    }

    /// Completed turns so far. User messages whose reply failed are left out.
    fn transcript(&self) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = Vec::new();
        for exchange in &self.exchanges {
            if exchange.loading {
                continue;
            }
            if exchange.error {
                if messages.last().map(|m| m.role) == Some(ChatRole::User) {
                    messages.pop();
                }
                continue;
            }
            if exchange.is_user {
                messages.push(ChatMessage {
                    role: ChatRole::User,
                    content: exchange.query.clone(),
                });
            } else if let Some(response) = &exchange.response {
                messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: response.clone(),
                });
            }
        }
        messages
    }
}
