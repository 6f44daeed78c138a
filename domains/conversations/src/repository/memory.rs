//! In-process conversation store
//!
//! The session map is only write-locked to insert a session. Each session's
//! messages sit behind their own lock, so appends to different sessions never
//! contend and appends to the same session are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::entities::{Message, Session};
use crate::repository::ConversationStore;
use parley_common::{Error, Result};

struct SessionSlot {
    /// Insertion position, for stable listing order
    position: usize,
    session: Session,
    messages: Mutex<Vec<Message>>,
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: &str) -> Option<Arc<SessionSlot>> {
        self.sessions.read().await.get(id).cloned()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create_session(&self, id: &str, topic: &str) -> Result<Session> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(id) {
            return Err(Error::AlreadyExists {
                session_id: id.to_string(),
            });
        }

        let session = Session::new(id, topic);
        let slot = SessionSlot {
            position: sessions.len(),
            session: session.clone(),
            messages: Mutex::new(Vec::new()),
        };
        sessions.insert(id.to_string(), Arc::new(slot));

        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Option<Session> {
        self.slot(id).await.map(|slot| slot.session.clone())
    }

    async fn append_message(&self, session_id: &str, message: Message) -> Result<()> {
        if message.session_id != session_id {
            return Err(Error::Validation(format!(
                "Message belongs to session {}, not {}",
                message.session_id, session_id
            )));
        }

        let slot = self
            .slot(session_id)
            .await
            .ok_or_else(|| Error::SessionNotFound {
                session_id: session_id.to_string(),
            })?;

        slot.messages.lock().await.push(message);
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Vec<Message> {
        match self.slot(session_id).await {
            Some(slot) => slot.messages.lock().await.clone(),
            None => Vec::new(),
        }
    }

    async fn list_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        let mut slots: Vec<&Arc<SessionSlot>> = sessions.values().collect();
        slots.sort_by_key(|slot| slot.position);
        slots.into_iter().map(|slot| slot.session.clone()).collect()
    }
}
