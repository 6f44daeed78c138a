//! Domain entities for Conversations domain
//!
//! A session owns an append-only sequence of messages. Messages carry one of
//! four authors; only the two participants are human.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_common::{Error, Result};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// First participant
    First,
    /// Second participant
    Second,
    /// The mediating model
    Model,
    /// Reserved for a synthetic summary of older messages
    Summary,
}

impl Author {
    /// Whether a person (rather than the model or a summary) wrote the message
    pub fn is_human(&self) -> bool {
        matches!(self, Author::First | Author::Second)
    }

    /// Label used to tell the participants apart inside a single prompt role
    pub fn label(&self) -> &'static str {
        match self {
            Author::First => "Participant A",
            Author::Second => "Participant B",
            Author::Model => "Mediator",
            Author::Summary => "Summary",
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Author::First => write!(f, "first"),
            Author::Second => write!(f, "second"),
            Author::Model => write!(f, "model"),
            Author::Summary => write!(f, "summary"),
        }
    }
}

impl std::str::FromStr for Author {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(Author::First),
            "second" => Ok(Author::Second),
            "model" => Ok(Author::Model),
            "summary" => Ok(Author::Summary),
            other => Err(Error::Validation(format!("Unknown author: {other}"))),
        }
    }
}

/// Session entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Session {
            id: id.into(),
            topic: topic.into(),
            created_at: Utc::now(),
        }
    }

    /// Generate a fresh opaque session id
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: String,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a fresh id and the current timestamp
    pub fn new(session_id: impl Into<String>, author: Author, content: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            author,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
