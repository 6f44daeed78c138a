//! Same-session turns stay serialized under real concurrency
//!
//! Many participants hit one session at once. Every model call must see every
//! earlier reply, no two calls may overlap, and nothing may be lost.

use std::collections::HashSet;

use parley_conversations::Author;
use parley_llm::LlmRole;

use crate::common::TestApp;

const TURNS: usize = 12;

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_concurrent_turns_on_one_session_are_serialized() {
    let app = TestApp::new().with_latency(10);

    let mut handles = Vec::new();
    for i in 0..TURNS {
        let parley = app.parley.clone();
        handles.push(tokio::spawn(async move {
            let author = if i % 2 == 0 { Author::First } else { Author::Second };
            parley
                .submit_turn("shared", author, &format!("point {i}"), Some("Budget"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // No overlapping model calls
    assert_eq!(app.llm.max_concurrent_calls(), 1);

    // Call k saw exactly the k replies before it, on a strictly longer history
    let requests = app.llm.recorded_requests();
    assert_eq!(requests.len(), TURNS);
    for (k, request) in requests.iter().enumerate() {
        let replies_seen = request
            .messages
            .iter()
            .filter(|m| m.role == LlmRole::Assistant)
            .count();
        assert_eq!(replies_seen, k, "call {k} saw {replies_seen} earlier replies");

        if k > 0 {
            let previous = &requests[k - 1].messages;
            assert!(request.messages.len() > previous.len());
            assert_eq!(&request.messages[..previous.len()], previous.as_slice());
        }
    }

    // Nothing lost, nothing duplicated
    let history = app.parley.history("shared").await;
    assert_eq!(history.len(), TURNS * 2);
    let models = history.iter().filter(|m| m.author == Author::Model).count();
    assert_eq!(models, TURNS);
    let ids: HashSet<_> = history.iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), history.len());

    assert_eq!(app.parley.summary("shared").await.api_calls, TURNS as u64);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_many_sessions_each_stay_consistent() {
    let app = TestApp::new().with_latency(5);

    let mut handles = Vec::new();
    for session in 0..4 {
        for turn in 0..3 {
            let parley = app.parley.clone();
            handles.push(tokio::spawn(async move {
                parley
                    .submit_turn(
                        &format!("s{session}"),
                        Author::First,
                        &format!("turn {turn}"),
                        None,
                    )
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for session in 0..4 {
        let id = format!("s{session}");
        let history = app.parley.history(&id).await;
        assert_eq!(history.len(), 6);
        assert_eq!(
            history.iter().filter(|m| m.author == Author::Model).count(),
            3
        );
        assert!(history.iter().all(|m| m.session_id == id));
        assert_eq!(app.parley.summary(&id).await.api_calls, 3);
    }
    assert_eq!(app.parley.sessions().await.len(), 4);
}
