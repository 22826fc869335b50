//! Feed listing contracts: recency order, author filter, limits. Both
//! listings are full-collection scans by contract; these tests only pin
//! the observable ordering, not the cost.

use std::time::Duration;

use feed_core::FeedService;
use integration_tests::{memory_service, sqlite_service};
use uuid::Uuid;

async fn publish(service: &FeedService, author: &str, content: &str) -> String {
    let post_id = Uuid::now_v7().to_string();
    service
        .publish_post(&post_id, author, author, content)
        .await
        .unwrap();
    // keep created_at strictly increasing across publishes
    tokio::time::sleep(Duration::from_millis(2)).await;
    post_id
}

async fn recent_is_newest_first(service: &FeedService) {
    for i in 0..5 {
        publish(service, "alice", &format!("post {i}")).await;
    }

    let feed = service.list_recent_posts(3).await.unwrap();
    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0].content, "post 4");
    for pair in feed.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }

    // limit larger than the table returns everything
    assert_eq!(service.list_recent_posts(100).await.unwrap().len(), 5);
}

#[tokio::test]
async fn recent_is_newest_first_memory() {
    recent_is_newest_first(&memory_service()).await;
}

#[tokio::test]
async fn recent_is_newest_first_sqlite() {
    recent_is_newest_first(&sqlite_service().await).await;
}

#[tokio::test]
async fn by_author_returns_only_that_author_newest_first() {
    let service = memory_service();
    publish(&service, "alice", "a1").await;
    publish(&service, "bob", "b1").await;
    publish(&service, "alice", "a2").await;
    publish(&service, "bob", "b2").await;
    publish(&service, "alice", "a3").await;

    let feed = service.list_posts_by_author("alice", 10).await.unwrap();
    assert_eq!(feed.len(), 3);
    assert!(feed.iter().all(|p| p.author == "alice"));
    assert_eq!(
        feed.iter().map(|p| p.content.as_str()).collect::<Vec<_>>(),
        vec!["a3", "a2", "a1"]
    );

    let capped = service.list_posts_by_author("alice", 2).await.unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].content, "a3");

    assert!(service
        .list_posts_by_author("nobody", 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn published_post_snapshots_display_name() {
    let service = memory_service();
    service
        .publish_post("p1", "alice", "Alice the First", "hello")
        .await
        .unwrap();
    let post = service.get_post("p1").await.unwrap().unwrap();
    assert_eq!(post.author_display_name, "Alice the First");
    assert_eq!(post.like_count, 0);
    assert!(service.get_post("missing").await.unwrap().is_none());
}
