//! Registration semantics: insert-if-absent, never overwrite, input
//! validation, and the health probe.

use feed_core::{FeedError, FeedService};
use integration_tests::{memory_service, sqlite_service};

async fn second_registration_fails(service: &FeedService) {
    let first = service
        .register_user("alice", "Alice", "hash-one")
        .await
        .unwrap();

    let err = service
        .register_user("alice", "Someone Else", "hash-two")
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::UsernameTaken(name) if name == "alice"));

    // stored record still equals the first call's input
    let stored = service.find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.display_name, "Alice");
    assert_eq!(stored.password_hash, "hash-one");
}

#[tokio::test]
async fn second_registration_fails_memory() {
    second_registration_fails(&memory_service()).await;
}

#[tokio::test]
async fn second_registration_fails_sqlite() {
    second_registration_fails(&sqlite_service().await).await;
}

#[tokio::test]
async fn unknown_user_is_absent_not_an_error() {
    let service = memory_service();
    assert!(service.find_user("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_usernames_are_rejected() {
    let service = memory_service();
    for bad in ["", "has space", "p1::alice", &"x".repeat(40)] {
        let err = service.register_user(bad, "X", "h").await.unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)), "accepted {bad:?}");
    }
}

#[tokio::test]
async fn oversized_content_is_rejected() {
    let service = memory_service();
    let err = service
        .publish_post("p1", "alice", "Alice", &"x".repeat(5000))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Validation(_)));
    assert!(service.get_post("p1").await.unwrap().is_none());
}

#[tokio::test]
async fn health_check_passes_on_fresh_stores() {
    memory_service().health_check().await.unwrap();
    sqlite_service().await.health_check().await.unwrap();
}
