//! Domain entities for Usage domain

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::pricing::Pricing;

/// Token consumption of one successful model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub session_id: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub model: String,
    pub recorded_at: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(
        session_id: impl Into<String>,
        input_tokens: i64,
        output_tokens: i64,
        model: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            input_tokens,
            output_tokens,
            model: model.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Derived totals over a set of usage records. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_tokens: i64,
    pub api_calls: u64,
    pub estimated_cost: Decimal,
    /// Models seen, in first-seen order
    pub models: Vec<String>,
}

impl UsageSummary {
    /// Fold records into totals and a cost estimate
    pub fn from_records<'a, I>(records: I, pricing: &Pricing) -> Self
    where
        I: IntoIterator<Item = &'a UsageRecord>,
    {
        let mut summary = records
            .into_iter()
            .fold(UsageSummary::default(), |mut acc, record| {
                acc.total_input_tokens += record.input_tokens;
                acc.total_output_tokens += record.output_tokens;
                acc.api_calls += 1;
                if !acc.models.contains(&record.model) {
                    acc.models.push(record.model.clone());
                }
                acc
            });

        summary.total_tokens = summary.total_input_tokens + summary.total_output_tokens;
        summary.estimated_cost =
            pricing.cost(summary.total_input_tokens, summary.total_output_tokens);
        summary
    }
}
