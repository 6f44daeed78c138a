//! Parley application composition root
//!
//! Wires the transcript gateway, usage ledger and response orchestrator
//! together and exposes the surface the outer layers call: `submit_turn`
//! plus the read-only inspection queries.

use std::sync::Arc;

use parley_common::Config;
use parley_conversations::{Author, InMemoryConversationStore, Message, Session, TranscriptService};
use parley_llm::{LlmConfig, LlmService, LlmServiceFactory};
use parley_turns::{OrchestratorConfig, ResponseOrchestrator, TurnOutcome, TurnState};
use parley_usage::{UsageLedger, UsageRecord, UsageSummary};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber from configuration
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.rust_log)
        .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG '{}': {}", config.rust_log, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// The assembled conversation core
#[derive(Clone)]
pub struct Parley {
    transcript: TranscriptService,
    ledger: Arc<UsageLedger>,
    orchestrator: Arc<ResponseOrchestrator>,
}

impl Parley {
    /// Build the core with the provider named in configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = LlmServiceFactory::create(LlmConfig::from_config(config))
            .map_err(|e| anyhow::anyhow!("Failed to create LLM service: {}", e))?;

        Ok(Self::with_llm(config, Arc::from(llm)))
    }

    /// Build the core around an existing model service
    pub fn with_llm(config: &Config, llm: Arc<dyn LlmService>) -> Self {
        let store = Arc::new(InMemoryConversationStore::new());
        let transcript = TranscriptService::with_default_topic(store, config.default_topic.clone());
        let ledger = Arc::new(UsageLedger::new());

        let orchestrator = Arc::new(ResponseOrchestrator::new(
            transcript.clone(),
            ledger.clone(),
            llm,
            OrchestratorConfig::from_config(config),
        ));

        tracing::info!(model = %config.llm_model, provider = %config.llm_provider, "Parley core assembled");

        Self {
            transcript,
            ledger,
            orchestrator,
        }
    }

    /// Record a participant's message and get the model's reply
    pub async fn submit_turn(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
        topic: Option<&str>,
    ) -> parley_common::Result<TurnOutcome> {
        self.orchestrator
            .submit_turn(session_id, author, content, topic)
            .await
    }

    /// Gateway for saving messages outside a turn
    pub fn transcript(&self) -> &TranscriptService {
        &self.transcript
    }

    pub fn orchestrator(&self) -> &Arc<ResponseOrchestrator> {
        &self.orchestrator
    }

    pub async fn lookup_session(&self, session_id: &str) -> Option<Session> {
        self.transcript.lookup_session(session_id).await
    }

    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        self.transcript.history(session_id).await
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.transcript.sessions().await
    }

    pub async fn summary(&self, session_id: &str) -> UsageSummary {
        self.ledger.summary(session_id).await
    }

    pub async fn records(&self, session_id: &str) -> Vec<UsageRecord> {
        self.ledger.records(session_id).await
    }

    pub async fn total_summary(&self) -> UsageSummary {
        self.ledger.total_summary().await
    }

    pub async fn turn_state(&self, session_id: &str) -> TurnState {
        self.orchestrator.turn_state(session_id).await
    }
}
