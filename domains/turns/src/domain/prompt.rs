//! Transcript-to-prompt assembly
//!
//! The model API has two roles but a session has three voices. The model's
//! own messages become `Assistant` turns; every other message becomes a
//! `User` turn prefixed with its author's label. `to_llm_message` is the only
//! place that mapping lives.

use parley_conversations::{Author, Message};
use parley_llm::{CompletionRequest, LlmMessage, LlmRole};

/// Map one stored message to one model turn
pub fn to_llm_message(message: &Message) -> LlmMessage {
    match message.author {
        Author::Model => LlmMessage {
            role: LlmRole::Assistant,
            content: message.content.clone(),
        },
        author => LlmMessage {
            role: LlmRole::User,
            content: format!("{}: {}", author.label(), message.content),
        },
    }
}

/// Build the model request for a history, oldest message first
pub fn build_request(
    history: &[Message],
    system_prompt: &str,
    model: &str,
    max_tokens: Option<u32>,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        system_prompt: Some(system_prompt.to_string()),
        messages: history.iter().map(to_llm_message).collect(),
        max_tokens,
    }
}
