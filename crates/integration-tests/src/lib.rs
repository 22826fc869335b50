//! Shared fixtures for the behavior tests in `tests/`.

use std::sync::Arc;

use feed_core::FeedService;
use feed_store_memory::MemoryRecordStore;
use feed_store_sqlite::SqliteRecordStore;

/// Service over a fresh in-memory store.
pub fn memory_service() -> FeedService {
    FeedService::new(Arc::new(MemoryRecordStore::new()))
}

/// Service over a fresh in-memory SQLite database.
pub async fn sqlite_service() -> FeedService {
    let store = SqliteRecordStore::new("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    FeedService::new(Arc::new(store))
}

/// Registers a user and returns it, panicking on failure. Most tests want
/// a user to exist without caring about the registration path.
pub async fn given_user(service: &FeedService, username: &str) -> feed_core::User {
    service
        .register_user(username, &username.to_uppercase(), "$argon2id$demo")
        .await
        .expect("register fixture user")
}
