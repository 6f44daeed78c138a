//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default model identifier sent to the provider and recorded in usage
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default label for sessions created implicitly on first write
pub const DEFAULT_TOPIC: &str = "General decision";

/// Default system instruction for the mediating model
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a neutral mediator helping two people reach a \
decision together. Messages from the people are prefixed with their label. Summarise where \
they agree, surface where they differ, and suggest a next step.";

#[derive(Clone)]
pub struct Config {
    /// LLM provider (anthropic, mock)
    pub llm_provider: String,
    pub anthropic_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,

    /// Opaque system instruction passed with every model call
    pub system_prompt: String,
    pub default_topic: String,

    /// Bounded wait for a session's turn slot; `None` waits forever
    pub baton_timeout: Option<Duration>,
    /// Bounded model call; `None` waits forever
    pub model_timeout: Option<Duration>,

    /// Runtime configuration
    pub rust_log: String,
    pub log_format: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("llm_provider", &self.llm_provider)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("default_topic", &self.default_topic)
            .field("baton_timeout", &self.baton_timeout)
            .field("model_timeout", &self.model_timeout)
            .field("rust_log", &self.rust_log)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: "mock".to_string(),
            anthropic_api_key: None,
            llm_base_url: None,
            llm_model: DEFAULT_MODEL.to_string(),
            llm_max_tokens: 1024,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            default_topic: DEFAULT_TOPIC.to_string(),
            baton_timeout: None,
            model_timeout: None,
            rust_log: "parley=info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let llm_provider = lookup("LLM_PROVIDER").unwrap_or(defaults.llm_provider);
        let anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty());

        if llm_provider == "anthropic" && anthropic_api_key.is_none() {
            return Err(Error::Configuration(
                "ANTHROPIC_API_KEY is required for the anthropic provider".to_string(),
            ));
        }

        let llm_max_tokens = match lookup("LLM_MAX_TOKENS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                Error::Configuration(format!("LLM_MAX_TOKENS must be a positive integer: {raw}"))
            })?,
            None => defaults.llm_max_tokens,
        };

        let config = Self {
            llm_provider,
            anthropic_api_key,
            llm_base_url: lookup("LLM_BASE_URL"),
            llm_model: lookup("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_max_tokens,
            system_prompt: lookup("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            default_topic: lookup("DEFAULT_TOPIC").unwrap_or(defaults.default_topic),
            baton_timeout: parse_millis("BATON_TIMEOUT_MS", lookup("BATON_TIMEOUT_MS"))?,
            model_timeout: parse_millis("MODEL_TIMEOUT_MS", lookup("MODEL_TIMEOUT_MS"))?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
        };

        tracing::debug!(provider = %config.llm_provider, model = %config.llm_model, "Configuration loaded");

        Ok(config)
    }
}

fn parse_millis(key: &str, raw: Option<String>) -> Result<Option<Duration>> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| Error::Configuration(format!("{key} must be milliseconds: {raw}"))),
    }
}
