pub mod ai;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod persona;
pub mod session;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for backend implementors
pub use async_trait::async_trait;

// Re-export main types for convenience
pub use ai::{CompletionBackend, GeminiClient, GenerationRequest};
pub use completion::{build_transcript, CompletionClient, CompletionOutcome};
pub use config::{Config, Theme};
pub use conversation::Conversation;
pub use credentials::CredentialPool;
pub use error::{StoreError, TransportError};
pub use session::{ChatSession, PendingSend, SendRejected, SendState};
pub use state::{ChatRole, ChatTurn};
pub use store::{HistoryStore, JsonFileStore, MemoryStore};
