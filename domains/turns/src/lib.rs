//! Turns domain: per-session turn serialization and the response orchestrator

pub mod baton;
pub mod domain;
pub mod orchestrator;

pub use baton::{BatonGuard, SessionBatons};
pub use domain::prompt::{build_request, to_llm_message};
pub use domain::state::{TurnEvent, TurnState, TurnStateMachine};
pub use orchestrator::{OrchestratorConfig, ResponseOrchestrator, TurnOutcome};
