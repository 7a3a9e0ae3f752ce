pub mod ai;
pub mod config;
pub mod error;
pub mod history;
pub mod provider;
pub mod session;
pub mod state;
pub mod storage;

// Re-export main types for convenience
pub use ai::{BotReply, ChatBackend, ChatRequest, CompletionsClient, GatewayClient, ReplyShape};
pub use config::Config;
pub use error::{ChatError, StorageError, TransportError};
pub use history::{default_history, HistoryStore, HISTORY_KEY};
pub use provider::Provider;
pub use session::{ChatSession, PendingSend};
pub use state::{ChatMessage, ChatRole, Exchange, HistoryEntry, DEFAULT_GREETING, FALLBACK_REPLY};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
