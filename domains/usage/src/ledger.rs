//! Append-only usage ledger
//!
//! Records are kept per session in insertion order. A summary is folded from
//! the records on every read, so it always matches them.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entities::{UsageRecord, UsageSummary};
use crate::domain::pricing::Pricing;
use parley_common::{Error, Result};

#[derive(Default)]
pub struct UsageLedger {
    records: RwLock<HashMap<String, Vec<UsageRecord>>>,
    pricing: Pricing,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing(pricing: Pricing) -> Self {
        Self {
            records: RwLock::default(),
            pricing,
        }
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Append one record. Negative token counts are rejected with `InvalidUsage`.
    pub async fn record(
        &self,
        session_id: &str,
        input_tokens: i64,
        output_tokens: i64,
        model: &str,
    ) -> Result<UsageRecord> {
        if input_tokens < 0 || output_tokens < 0 {
            return Err(Error::InvalidUsage {
                session_id: session_id.to_string(),
                input_tokens,
                output_tokens,
            });
        }

        let record = UsageRecord::new(session_id, input_tokens, output_tokens, model);
        self.records
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(record.clone());

        tracing::debug!(
            session_id = %session_id,
            model = %model,
            input_tokens,
            output_tokens,
            "Usage recorded"
        );

        Ok(record)
    }

    /// Totals for one session; zeroed when nothing was recorded
    pub async fn summary(&self, session_id: &str) -> UsageSummary {
        let records = self.records.read().await;
        match records.get(session_id) {
            Some(session_records) => UsageSummary::from_records(session_records, &self.pricing),
            None => UsageSummary::default(),
        }
    }

    /// Raw per-call history for one session, oldest first
    pub async fn records(&self, session_id: &str) -> Vec<UsageRecord> {
        self.records
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Totals across every session
    pub async fn total_summary(&self) -> UsageSummary {
        let records = self.records.read().await;
        UsageSummary::from_records(records.values().flatten(), &self.pricing)
    }
}
