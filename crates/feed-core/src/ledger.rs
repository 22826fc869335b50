//! # Post Ledger
//!
//! Post records keyed by caller-generated identifier, plus the two feed
//! listings. Listings enumerate the full collection and sort client-side:
//! O(n) over the whole table, no pagination token. That is the contract:
//! a secondary-index-backed adapter could replace the bodies of the
//! listing methods without changing it, but callers must not assume the
//! cost is sub-linear.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{FeedError, Result, StoreError};
use crate::models::Post;
use crate::traits::{Collection, Record, RecordStore};

const MAX_CONTENT_LEN: usize = 4096;

pub struct PostLedger {
    store: Arc<dyn RecordStore>,
}

fn decode_post(record: Record) -> Result<Post> {
    serde_json::from_value(record)
        .map_err(|e| StoreError::Unavailable(format!("decode post: {e}")).into())
}

impl PostLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Stores a new post with a zeroed like counter. The caller owns
    /// collision resistance of `post_id`; an identifier collision
    /// overwrites silently (caller contract, not a defended-against
    /// fault).
    pub async fn publish(
        &self,
        post_id: &str,
        author: &str,
        author_display_name: &str,
        content: &str,
    ) -> Result<Post> {
        if content.is_empty() || content.len() > MAX_CONTENT_LEN {
            return Err(FeedError::Validation(format!(
                "content must be 1-{MAX_CONTENT_LEN} bytes"
            )));
        }

        let post = Post {
            post_id: post_id.to_string(),
            author: author.to_string(),
            author_display_name: author_display_name.to_string(),
            content: content.to_string(),
            like_count: 0,
            created_at: Utc::now(),
        };
        let record = serde_json::to_value(&post)
            .map_err(|e| StoreError::Unavailable(format!("encode post: {e}")))?;

        self.store
            .put(Collection::Posts, post_id, record, false)
            .await?;
        tracing::info!(post_id, author, "post published");
        Ok(post)
    }

    pub async fn get(&self, post_id: &str) -> Result<Option<Post>> {
        let record = self.store.get(Collection::Posts, post_id).await?;
        record.map(decode_post).transpose()
    }

    /// Newest posts first, at most `limit` of them. Full-table scan.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Post>> {
        let records = self.store.scan(Collection::Posts).await?;
        Self::order_feed(records, limit)
    }

    /// Newest posts by `author` first, at most `limit` of them. Same
    /// full-scan strategy, filtered at the store.
    pub async fn list_by_author(&self, author: &str, limit: usize) -> Result<Vec<Post>> {
        let records = self
            .store
            .query(Collection::Posts, &|r| {
                r.get("author").and_then(|a| a.as_str()) == Some(author)
            })
            .await?;
        Self::order_feed(records, limit)
    }

    fn order_feed(records: Vec<Record>, limit: usize) -> Result<Vec<Post>> {
        let mut posts = records
            .into_iter()
            .map(decode_post)
            .collect::<Result<Vec<_>>>()?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        Ok(posts)
    }
}
