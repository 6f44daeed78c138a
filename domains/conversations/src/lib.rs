//! Conversations domain: sessions, append-only transcripts, transcript gateway

pub mod domain;
pub mod repository;
pub mod transcript;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Author, Message, Session};

// Re-export repository types
pub use repository::{ConversationStore, InMemoryConversationStore};

pub use transcript::TranscriptService;
