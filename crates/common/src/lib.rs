//! Shared configuration, error taxonomy and state-machine types for Parley
//!
//! This crate provides common functionality used across the Parley core:
//! - Configuration management following 12-factor principles
//! - The error taxonomy shared by the store, ledger and orchestrator
//! - State machine error types

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::StateError;
