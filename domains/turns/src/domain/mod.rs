//! Domain layer for Turns

pub mod prompt;
pub mod state;
