//! Usage domain: per-call token accounting and cost summaries
//!
//! The ledger never sees message text, only token counts and model names.

pub mod domain;
pub mod ledger;

pub use domain::entities::{UsageRecord, UsageSummary};
pub use domain::pricing::Pricing;
pub use ledger::UsageLedger;
