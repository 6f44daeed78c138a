//! Response orchestrator
//!
//! Runs one turn end to end under the session's baton:
//! history read, request assembly, model call, usage, reply persistence.
//! A failure anywhere before the reply is persisted leaves the transcript
//! untouched. The baton is released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use parley_common::{Config, Error, Result};
use parley_conversations::{Author, Message, TranscriptService};
use parley_llm::{CompletionRequest, CompletionResponse, LlmError, LlmService};
use parley_usage::UsageLedger;
use serde::Serialize;

use crate::baton::SessionBatons;
use crate::domain::prompt::build_request;
use crate::domain::state::TurnState;

/// Settings for every turn the orchestrator runs
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Opaque system instruction sent with every call
    pub system_prompt: String,
    /// Model identifier; empty defers to the service default
    pub model: String,
    pub max_tokens: Option<u32>,
    pub baton_timeout: Option<Duration>,
    pub model_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            model: config.llm_model.clone(),
            max_tokens: Some(config.llm_max_tokens),
            baton_timeout: config.baton_timeout,
            model_timeout: config.model_timeout,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of one successful turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub reply_text: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub model: String,
    /// The stored model message
    pub message: Message,
}

pub struct ResponseOrchestrator {
    transcript: TranscriptService,
    ledger: Arc<UsageLedger>,
    llm: Arc<dyn LlmService>,
    batons: SessionBatons,
    config: OrchestratorConfig,
}

impl ResponseOrchestrator {
    pub fn new(
        transcript: TranscriptService,
        ledger: Arc<UsageLedger>,
        llm: Arc<dyn LlmService>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            transcript,
            ledger,
            llm,
            batons: SessionBatons::new(),
            config,
        }
    }

    /// Record a participant's message, then run a turn for the session
    pub async fn submit_turn(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
        topic: Option<&str>,
    ) -> Result<TurnOutcome> {
        if !author.is_human() {
            return Err(Error::Validation(format!(
                "Only participants can submit turns, not {author}"
            )));
        }
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }

        self.transcript
            .record_turn(session_id, author, content, topic)
            .await?;

        self.respond(session_id).await
    }

    /// Run one turn against the session's current transcript.
    ///
    /// Callers persist the participant's message before calling this.
    pub async fn respond(&self, session_id: &str) -> Result<TurnOutcome> {
        let _baton = self
            .batons
            .acquire(session_id, self.config.baton_timeout)
            .await?;

        let result = self.run_turn(session_id).await;

        if let Err(e) = &result {
            tracing::error!(
                session_id = %session_id,
                code = e.error_code(),
                error = %e,
                "Turn failed"
            );
        }

        result
    }

    async fn run_turn(&self, session_id: &str) -> Result<TurnOutcome> {
        let history = self.transcript.history(session_id).await;
        let request = build_request(
            &history,
            &self.config.system_prompt,
            &self.config.model,
            self.config.max_tokens,
        );

        tracing::debug!(session_id = %session_id, turns = history.len(), "Calling model");

        let response = self
            .call_model(request)
            .await
            .map_err(|e| Error::ModelCallFailed {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })?;

        let reply_text = match response.first_text() {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!(
                    session_id = %session_id,
                    stop_reason = %response.stop_reason,
                    "Model reply had no text block, recording an empty reply"
                );
                String::new()
            }
        };

        self.ledger
            .record(
                session_id,
                i64::from(response.input_tokens),
                i64::from(response.output_tokens),
                &response.model,
            )
            .await?;

        let message = self
            .transcript
            .record_turn(session_id, Author::Model, &reply_text, None)
            .await?;

        tracing::info!(
            session_id = %session_id,
            model = %response.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Turn completed"
        );

        Ok(TurnOutcome {
            reply_text,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            model: response.model,
            message,
        })
    }

    async fn call_model(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, LlmError> {
        match self.config.model_timeout {
            Some(limit) => tokio::time::timeout(limit, self.llm.complete(request))
                .await
                .map_err(|_| LlmError::Timeout(limit.as_millis() as u64))?,
            None => self.llm.complete(request).await,
        }
    }

    /// Whether the session has a turn in flight
    pub async fn turn_state(&self, session_id: &str) -> TurnState {
        self.batons.state(session_id).await
    }

    /// Turns waiting behind the one in flight
    pub async fn queued_turns(&self, session_id: &str) -> usize {
        self.batons.queued(session_id).await
    }

    /// Read-only access to the transcript gateway
    pub fn transcript(&self) -> &TranscriptService {
        &self.transcript
    }

    /// Read-only access to the usage ledger
    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }
}
