//! Repository implementations for Conversations domain
//!
//! `ConversationStore` is the storage contract. A durable backend must keep
//! the same semantics to be a drop-in replacement: sessions are unique,
//! messages are append-only, and each session's sequence keeps append order.

pub mod memory;

use crate::domain::entities::{Message, Session};
use parley_common::Result;

pub use memory::InMemoryConversationStore;

/// Keyed storage of sessions and their message sequences
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a session with an empty message sequence.
    ///
    /// Fails with `AlreadyExists` if `id` is already present.
    async fn create_session(&self, id: &str, topic: &str) -> Result<Session>;

    /// Find session by ID
    async fn get_session(&self, id: &str) -> Option<Session>;

    /// Append to the end of the session's sequence.
    ///
    /// Fails with `SessionNotFound` if the session was never created.
    async fn append_message(&self, session_id: &str, message: Message) -> Result<()>;

    /// Full chronological sequence; empty when the session is absent
    async fn list_messages(&self, session_id: &str) -> Vec<Message>;

    /// All sessions, oldest first
    async fn list_sessions(&self) -> Vec<Session>;
}
