//! Transcript gateway and store contract tests

use std::sync::Arc;

use parley_common::Error;
use parley_conversations::{
    Author, ConversationStore, InMemoryConversationStore, Message, TranscriptService,
};

use crate::common::TestApp;

mod test_transcript {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_first_message_creates_session_with_topic() {
        let app = TestApp::new();

        app.parley
            .transcript()
            .record_turn("s1", Author::First, "Should we move?", Some("Moving"))
            .await
            .unwrap();

        let history = app.parley.history("s1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].author, Author::First);
        assert_eq!(history[0].content, "Should we move?");
        assert_eq!(app.parley.lookup_session("s1").await.unwrap().topic, "Moving");
    }

    #[test_log::test(tokio::test)]
    async fn test_history_grows_by_one_per_record() {
        let app = TestApp::new();
        let transcript = app.parley.transcript();

        let authors = [
            Author::First,
            Author::Second,
            Author::Second,
            Author::Model,
            Author::First,
        ];
        for (i, author) in authors.into_iter().enumerate() {
            let before = app.parley.history("s1").await.len();
            transcript
                .record_turn("s1", author, &format!("message {i}"), None)
                .await
                .unwrap();
            assert_eq!(app.parley.history("s1").await.len(), before + 1);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_sessions_listed_oldest_first() {
        let app = TestApp::new();
        for id in ["kitchen", "holiday", "car"] {
            app.parley
                .transcript()
                .record_turn(id, Author::First, "start", None)
                .await
                .unwrap();
        }

        let ids: Vec<String> = app.parley.sessions().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["kitchen", "holiday", "car"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_transcript_over_shared_store() {
        let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
        let a = TranscriptService::new(store.clone());
        let b = TranscriptService::new(store);

        a.record_turn("s1", Author::First, "from a", None).await.unwrap();
        b.record_turn("s1", Author::Second, "from b", None).await.unwrap();

        assert_eq!(a.history("s1").await.len(), 2);
        assert_eq!(b.history("s1").await.len(), 2);
    }
}

mod test_store_contract {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_duplicate_create_fails() {
        let store = InMemoryConversationStore::new();
        store.create_session("s1", "Moving").await.unwrap();

        let err = store.create_session("s1", "Moving").await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
        assert_eq!(err.session_id(), Some("s1"));
    }

    #[test_log::test(tokio::test)]
    async fn test_append_to_unknown_session_fails() {
        let store = InMemoryConversationStore::new();
        let err = store
            .append_message("never", Message::new("never", Author::First, "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SessionNotFound { .. }));
        assert_eq!(err.session_id(), Some("never"));
    }
}
