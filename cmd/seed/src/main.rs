//! # seed
//!
//! Demo collaborator for the engagement core: wires a store adapter
//! selected at compile time, registers a couple of users, publishes
//! posts and toggles likes, then prints the resulting feed. Useful for
//! smoke-testing an adapter and for populating a local database.

use std::sync::Arc;

use anyhow::Context;
use feed_core::{FeedService, RecordStore};
use uuid::Uuid;

#[cfg(not(any(feature = "store-sqlite", feature = "store-memory")))]
compile_error!("enable one store feature: store-sqlite or store-memory");

#[cfg(feature = "store-sqlite")]
async fn build_store() -> anyhow::Result<Arc<dyn RecordStore>> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:feed.db".into());
    tracing::info!(%url, "using sqlite store");
    let store = feed_store_sqlite::SqliteRecordStore::new(&url)
        .await
        .context("init sqlite store")?;
    Ok(Arc::new(store))
}

#[cfg(all(feature = "store-memory", not(feature = "store-sqlite")))]
async fn build_store() -> anyhow::Result<Arc<dyn RecordStore>> {
    tracing::info!("using in-memory store (nothing will be persisted)");
    Ok(Arc::new(feed_store_memory::MemoryRecordStore::new()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let service = FeedService::new(build_store().await?);
    service.health_check().await.context("store unreachable")?;

    for (username, display_name) in [("alice", "Alice"), ("bob", "Bob")] {
        match service.register_user(username, display_name, "$seed$not-a-real-hash").await {
            Ok(user) => tracing::info!(username = %user.username, "registered"),
            Err(feed_core::FeedError::UsernameTaken(_)) => {
                tracing::info!(username, "already registered, keeping existing record")
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut first_post_id = None;
    for (author, display_name, content) in [
        ("alice", "Alice", "hello feed"),
        ("alice", "Alice", "second thoughts"),
        ("bob", "Bob", "bob was here"),
    ] {
        let post_id = Uuid::now_v7().to_string();
        service
            .publish_post(&post_id, author, display_name, content)
            .await?;
        first_post_id.get_or_insert(post_id);
    }

    // One like that stays, one that is toggled off again.
    let p1 = first_post_id.expect("at least one post seeded");
    service.toggle_like(&p1, "bob").await?;
    service.toggle_like(&p1, "alice").await?;
    service.toggle_like(&p1, "alice").await?;

    for post in service.list_recent_posts(10).await? {
        tracing::info!(
            post_id = %post.post_id,
            author = %post.author,
            likes = post.like_count,
            content = %post.content,
            "seeded post"
        );
    }

    Ok(())
}
