//! # Feed Service Facade
//!
//! The single entry point handed to the request-handling collaborator.
//! Thin delegation over the three semantic layers sharing one store; only
//! the like path carries extra logic (in [`crate::engagement`]).

use std::sync::Arc;

use crate::directory::UserDirectory;
use crate::engagement::{LikeEngine, LikeOutcome};
use crate::error::Result;
use crate::ledger::PostLedger;
use crate::models::{Post, User};
use crate::traits::{Collection, RecordStore};

pub struct FeedService {
    store: Arc<dyn RecordStore>,
    users: UserDirectory,
    posts: PostLedger,
    likes: LikeEngine,
}

impl FeedService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            users: UserDirectory::new(store.clone()),
            posts: PostLedger::new(store.clone()),
            likes: LikeEngine::new(store.clone()),
            store,
        }
    }

    pub async fn register_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User> {
        self.users.register(username, display_name, password_hash).await
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        self.users.lookup(username).await
    }

    pub async fn publish_post(
        &self,
        post_id: &str,
        author: &str,
        author_display_name: &str,
        content: &str,
    ) -> Result<Post> {
        self.posts
            .publish(post_id, author, author_display_name, content)
            .await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        self.posts.get(post_id).await
    }

    pub async fn list_recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        self.posts.list_recent(limit).await
    }

    pub async fn list_posts_by_author(&self, author: &str, limit: usize) -> Result<Vec<Post>> {
        self.posts.list_by_author(author, limit).await
    }

    pub async fn toggle_like(&self, post_id: &str, username: &str) -> Result<LikeOutcome> {
        self.likes.toggle(post_id, username).await
    }

    pub async fn has_liked(&self, post_id: &str, username: &str) -> Result<bool> {
        self.likes.has_liked(post_id, username).await
    }

    /// Probes reachability of all three collections with a sentinel
    /// lookup. Absence is fine; only transport failure fails the probe.
    /// Backs the collaborator's liveness endpoint.
    pub async fn health_check(&self) -> Result<()> {
        for collection in Collection::ALL {
            self.store.get(collection, "__health__").await?;
        }
        Ok(())
    }
}
