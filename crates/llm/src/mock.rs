//! Mock LLM Service Implementation
//!
//! Programmable mock for testing turn workflows:
//! - `MockLlmService`: configurable mock with request recording
//! - `MockLlmBehavior`: controls outcome, latency and reply text
//! - `MockOutcome`: Reply, Fail, or NoText
//!
//! The mock also tracks how many calls are in flight at once, so tests can
//! assert on overlap between concurrent turns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{CompletionRequest, CompletionResponse, ContentBlock, LlmError, LlmService};

const MOCK_MODEL: &str = "mock-model";

/// What outcome the mock should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockOutcome {
    /// Reply with one text block
    #[default]
    Reply,
    /// Fail with a response error
    Fail,
    /// Succeed without any text block
    NoText,
}

#[derive(Debug, Clone, Default)]
struct BehaviorState {
    outcome: MockOutcome,
    delay_ms: u64,
    reply_text: Option<String>,
}

/// Programmable behavior for the mock LLM service
#[derive(Debug, Default)]
pub struct MockLlmBehavior {
    state: Mutex<BehaviorState>,
}

impl MockLlmBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BehaviorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Configure the mock outcome
    pub fn set_outcome(&self, outcome: MockOutcome) {
        self.state().outcome = outcome;
    }

    /// Configure latency before the reply is returned
    pub fn set_delay_ms(&self, delay: u64) {
        self.state().delay_ms = delay;
    }

    /// Configure a fixed reply text instead of the echo
    pub fn set_reply_text(&self, text: impl Into<String>) {
        self.state().reply_text = Some(text.into());
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        *self.state() = BehaviorState::default();
    }

    /// Read current outcome
    pub fn get_outcome(&self) -> MockOutcome {
        self.state().outcome.clone()
    }

    /// Read current delay
    pub fn get_delay_ms(&self) -> u64 {
        self.state().delay_ms
    }
}

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    behavior: Arc<MockLlmBehavior>,
    history: Arc<Mutex<Vec<CompletionRequest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter on every exit path
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: Arc<MockLlmBehavior>) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockLlmBehavior> {
        &self.behavior
    }

    /// Get recorded requests in arrival order
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Clear history and the in-flight high-water mark
    pub fn reset_history(&self) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    /// Highest number of calls observed running at the same time
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!(turns = request.messages.len(), "Mock LLM service processing completion request");

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let BehaviorState {
            outcome,
            delay_ms,
            reply_text,
        } = self.behavior.state().clone();

        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let model = if request.model.is_empty() {
            MOCK_MODEL.to_string()
        } else {
            request.model
        };

        let input_tokens = request
            .messages
            .iter()
            .map(|m| (m.content.len() as i32 / 4).max(1))
            .sum::<i32>();

        match outcome {
            MockOutcome::Fail => Err(LlmError::Response(
                "Mock LLM failure (overloaded)".to_string(),
            )),
            MockOutcome::NoText => Ok(CompletionResponse {
                content: vec![ContentBlock::Other {
                    kind: "tool_use".to_string(),
                }],
                model,
                input_tokens,
                output_tokens: 0,
                stop_reason: "tool_use".to_string(),
            }),
            MockOutcome::Reply => {
                // Echo the last turn unless a fixed reply is configured
                let content = reply_text.unwrap_or_else(|| {
                    let last_message = request
                        .messages
                        .last()
                        .map(|m| m.content.as_str())
                        .unwrap_or("empty");
                    format!("Mock response to: {}", last_message)
                });
                let output_tokens = (content.len() as i32 / 4).max(1);

                Ok(CompletionResponse {
                    content: vec![ContentBlock::Text { text: content }],
                    model,
                    input_tokens,
                    output_tokens,
                    stop_reason: "end_turn".to_string(),
                })
            }
        }
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }
}
