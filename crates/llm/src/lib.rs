//! Parley LLM Service
//!
//! Provides the outbound model-call contract with support for:
//! - Anthropic Messages API integration for production
//! - Programmable mock service for testing and development
//!
//! The contract only distinguishes two roles. Callers that have more voices
//! than that are responsible for folding them into `User` turns.

pub mod anthropic;
pub mod mock;

use parley_common::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("LLM call timed out after {0}ms")]
    Timeout(u64),
}

/// Role of one turn in the model request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

/// One turn of the model request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

/// Model request: system instruction plus ordered turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier; empty means the service default
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

/// One content block of a model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Other { kind: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// Model reply with the token counts the provider reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

impl CompletionResponse {
    /// First text-typed content block, if the reply has one
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other { .. } => None,
        })
    }
}

/// LLM service configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// LLM provider (anthropic, mock)
    pub provider: String,
    pub api_key: String,
    /// Override for the provider endpoint
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    /// Derive the provider configuration from the application config
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.llm_provider.clone(),
            api_key: config.anthropic_api_key.clone().unwrap_or_default(),
            base_url: config.llm_base_url.clone(),
            default_model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }
}

/// LLM service trait for different implementations
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run one stateless completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when the request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// Factory for creating LlmService implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LlmService based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "anthropic" => {
                tracing::info!(model = %config.default_model, "Creating Anthropic LLM service");
                if config.api_key.is_empty() {
                    return Err(LlmError::Configuration(
                        "ANTHROPIC_API_KEY is required for anthropic provider".to_string(),
                    ));
                }
                Ok(Box::new(anthropic::AnthropicService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: anthropic, mock",
                provider
            ))),
        }
    }
}
