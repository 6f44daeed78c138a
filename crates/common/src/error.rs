//! Common error types and handling for Parley
//!
//! Store and ledger errors are contract violations and propagate unchanged.
//! Every session-scoped variant carries the session id so the caller can log
//! the real cause while showing the user a single generic failure.

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to end users for any failed turn
pub const PUBLIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Common error type for the Parley core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Session already exists: {session_id}")]
    AlreadyExists { session_id: String },

    #[error(
        "Invalid usage for session {session_id}: input_tokens={input_tokens}, output_tokens={output_tokens}"
    )]
    InvalidUsage {
        session_id: String,
        input_tokens: i64,
        output_tokens: i64,
    },

    #[error("Model call failed for session {session_id}: {reason}")]
    ModelCallFailed { session_id: String, reason: String },

    #[error("Timed out after {waited_ms}ms waiting for the turn slot of session {session_id}")]
    BatonTimeout { session_id: String, waited_ms: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Get the stable error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            Error::AlreadyExists { .. } => "ALREADY_EXISTS",
            Error::InvalidUsage { .. } => "INVALID_USAGE",
            Error::ModelCallFailed { .. } => "MODEL_CALL_FAILED",
            Error::BatonTimeout { .. } => "BATON_TIMEOUT",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Session the failure belongs to, if any
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Error::SessionNotFound { session_id }
            | Error::AlreadyExists { session_id }
            | Error::InvalidUsage { session_id, .. }
            | Error::ModelCallFailed { session_id, .. }
            | Error::BatonTimeout { session_id, .. } => Some(session_id),
            Error::Validation(_) | Error::Configuration(_) => None,
        }
    }

    /// Generic user-facing text; never includes internal details
    pub fn public_message(&self) -> &'static str {
        PUBLIC_FAILURE_MESSAGE
    }

    /// Whether the error was caused by the external model rather than by misuse
    /// of the store or ledger contracts
    pub fn is_model_failure(&self) -> bool {
        matches!(self, Error::ModelCallFailed { .. })
    }
}
