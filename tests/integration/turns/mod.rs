//! Turn orchestration tests: failure handling, cross-session parallelism,
//! queueing on a busy session

use std::time::{Duration, Instant};

use parley_common::Error;
use parley_conversations::Author;
use parley_llm::mock::MockOutcome;
use parley_turns::TurnState;

use crate::common::TestApp;

#[test_log::test(tokio::test)]
async fn test_inbound_flow_human_saved_then_respond() {
    let app = TestApp::new();

    app.parley
        .transcript()
        .record_turn("s1", Author::Second, "I'd rather stay.", Some("Moving"))
        .await
        .unwrap();
    let outcome = app.parley.orchestrator().respond("s1").await.unwrap();

    let history = app.parley.history("s1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].author, Author::Model);
    assert_eq!(history[1].content, outcome.reply_text);
    assert!(outcome.input_tokens > 0);
    assert!(outcome.output_tokens > 0);
}

#[test_log::test(tokio::test)]
async fn test_failed_turn_releases_session_and_keeps_history() {
    let app = TestApp::with_baton_timeout(Duration::from_secs(2));
    app.llm.behavior().set_outcome(MockOutcome::Fail);

    let err = app
        .parley
        .submit_turn("s1", Author::First, "Should we move?", Some("Moving"))
        .await
        .unwrap_err();

    assert!(err.is_model_failure());
    assert_eq!(err.session_id(), Some("s1"));
    assert!(!err.public_message().contains("Mock"));

    // Only the participant's own message was kept
    let history = app.parley.history("s1").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].author, Author::First);
    assert!(app.parley.records("s1").await.is_empty());
    assert_eq!(app.parley.turn_state("s1").await, TurnState::Idle);

    // The next turn for the same session is admitted
    app.llm.behavior().set_outcome(MockOutcome::Reply);
    let outcome = app
        .parley
        .submit_turn("s1", Author::Second, "Still there?", None)
        .await
        .unwrap();

    let history = app.parley.history("s1").await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].content, outcome.reply_text);
    assert_eq!(app.parley.records("s1").await.len(), 1);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_distinct_sessions_run_in_parallel() {
    let latency = 200;
    let app = TestApp::new().with_latency(latency);

    let started = Instant::now();
    let (a, b) = tokio::join!(
        app.parley.submit_turn("s1", Author::First, "Rent or buy?", None),
        app.parley.submit_turn("s2", Author::Second, "Beach or city?", None),
    );
    let elapsed = started.elapsed();

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(app.llm.max_concurrent_calls(), 2);
    assert!(
        elapsed < Duration::from_millis(latency * 2),
        "two sessions took {:?}, expected about one call's latency",
        elapsed
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_busy_session_queues_second_turn() {
    let app = TestApp::new().with_latency(150);
    let parley = app.parley.clone();

    let first = {
        let parley = parley.clone();
        tokio::spawn(async move { parley.submit_turn("s1", Author::First, "Move?", None).await })
    };
    while parley.turn_state("s1").await != TurnState::Locked {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let second = {
        let parley = parley.clone();
        tokio::spawn(async move { parley.submit_turn("s1", Author::Second, "Stay?", None).await })
    };
    while parley.orchestrator().queued_turns("s1").await == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(parley.turn_state("s1").await, TurnState::Locked);

    first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    // The queued turn saw the first turn's reply
    let requests = app.llm.recorded_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(app.llm.max_concurrent_calls(), 1);
    assert!(requests[1].messages.len() > requests[0].messages.len());
    assert_eq!(parley.history("s1").await.last().unwrap().content, second.reply_text);
    assert_eq!(parley.orchestrator().queued_turns("s1").await, 0);
}

#[test_log::test(tokio::test)]
async fn test_turn_behind_stuck_turn_times_out() {
    let app = TestApp::with_baton_timeout(Duration::from_millis(50)).with_latency(500);
    let parley = app.parley.clone();

    let stuck = {
        let parley = parley.clone();
        tokio::spawn(async move { parley.submit_turn("s1", Author::First, "Slow one", None).await })
    };
    while parley.turn_state("s1").await != TurnState::Locked {
        tokio::task::yield_now().await;
    }

    let err = parley.orchestrator().respond("s1").await.unwrap_err();
    assert!(matches!(err, Error::BatonTimeout { .. }));
    assert_eq!(err.error_code(), "BATON_TIMEOUT");

    assert!(stuck.await.unwrap().is_ok());
}
