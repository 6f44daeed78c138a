//! Usage ledger tests through the assembled core

use rust_decimal::Decimal;

use parley_conversations::Author;
use parley_usage::{Pricing, UsageLedger};

use crate::common::TestApp;

#[test_log::test(tokio::test)]
async fn test_single_call_summary() {
    let ledger = UsageLedger::new();
    ledger.record("s1", 120, 340, "model-x").await.unwrap();

    let summary = ledger.summary("s1").await;
    assert_eq!(summary.total_input_tokens, 120);
    assert_eq!(summary.total_output_tokens, 340);
    assert_eq!(summary.total_tokens, 460);
    assert_eq!(summary.api_calls, 1);

    let pricing = Pricing::default();
    assert_eq!(
        summary.estimated_cost,
        Decimal::from(120) * pricing.input_per_token + Decimal::from(340) * pricing.output_per_token
    );
}

#[test_log::test(tokio::test)]
async fn test_summary_is_fold_of_records_after_turns() {
    let app = TestApp::new();
    for text in ["We could rent.", "Or buy.", "What about the commute?"] {
        app.parley
            .submit_turn("s1", Author::First, text, None)
            .await
            .unwrap();
    }

    let records = app.parley.records("s1").await;
    let summary = app.parley.summary("s1").await;
    assert_eq!(records.len(), 3);

    let input: i64 = records.iter().map(|r| r.input_tokens).sum();
    let output: i64 = records.iter().map(|r| r.output_tokens).sum();
    assert_eq!(summary.total_input_tokens, input);
    assert_eq!(summary.total_output_tokens, output);
    assert_eq!(summary.total_tokens, input + output);
    assert_eq!(summary.api_calls, 3);
    assert_eq!(summary.estimated_cost, Pricing::default().cost(input, output));
    assert_eq!(summary.models, vec![app.config.llm_model.clone()]);
}

#[test_log::test(tokio::test)]
async fn test_unknown_session_summary_is_zero() {
    let app = TestApp::new();
    let summary = app.parley.summary("nobody").await;

    assert_eq!(summary.total_tokens, 0);
    assert_eq!(summary.api_calls, 0);
    assert_eq!(summary.estimated_cost, Decimal::ZERO);
    assert!(app.parley.records("nobody").await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_total_summary_spans_sessions() {
    let app = TestApp::new();
    app.parley
        .submit_turn("s1", Author::First, "one", None)
        .await
        .unwrap();
    app.parley
        .submit_turn("s2", Author::Second, "two", None)
        .await
        .unwrap();

    let s1 = app.parley.summary("s1").await;
    let s2 = app.parley.summary("s2").await;
    let total = app.parley.total_summary().await;

    assert_eq!(total.api_calls, 2);
    assert_eq!(total.total_tokens, s1.total_tokens + s2.total_tokens);
    assert_eq!(total.estimated_cost, s1.estimated_cost + s2.estimated_cost);
}
