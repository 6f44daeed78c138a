//! Transcript gateway
//!
//! `TranscriptService` is the only component holding a store reference.
//! Everything else reads and writes conversation content through it, so a
//! future content transformation (summaries, encryption) has a single home.

use std::sync::Arc;

use crate::domain::entities::{Author, Message, Session};
use crate::repository::ConversationStore;
use parley_common::config::DEFAULT_TOPIC;
use parley_common::{Error, Result};

#[derive(Clone)]
pub struct TranscriptService {
    store: Arc<dyn ConversationStore>,
    default_topic: String,
}

impl TranscriptService {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self::with_default_topic(store, DEFAULT_TOPIC)
    }

    /// Use `default_topic` for sessions created without an explicit topic
    pub fn with_default_topic(
        store: Arc<dyn ConversationStore>,
        default_topic: impl Into<String>,
    ) -> Self {
        Self {
            store,
            default_topic: default_topic.into(),
        }
    }

    /// Append one message, creating the session on first write
    pub async fn record_turn(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
        topic: Option<&str>,
    ) -> Result<Message> {
        if self.store.get_session(session_id).await.is_none() {
            let topic = topic.unwrap_or(&self.default_topic);
            match self.store.create_session(session_id, topic).await {
                Ok(_) => {
                    tracing::info!(session_id = %session_id, "Session created on first write");
                }
                // Lost a creation race; the session exists either way
                Err(Error::AlreadyExists { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let message = Message::new(session_id, author, content);
        self.store
            .append_message(session_id, message.clone())
            .await?;

        tracing::debug!(session_id = %session_id, author = %author, message_id = %message.id, "Message recorded");

        Ok(message)
    }

    /// The messages the model should see, oldest first.
    ///
    /// Today this is every stored message.
    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        self.store.list_messages(session_id).await
    }

    /// Session metadata, if the session exists
    pub async fn lookup_session(&self, session_id: &str) -> Option<Session> {
        self.store.get_session(session_id).await
    }

    /// All sessions, oldest first
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.list_sessions().await
    }
}
