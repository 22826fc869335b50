//! # Like Engine
//!
//! Keeps the membership set `(post_id, username) -> liked` and the
//! denormalized `like_count` on the post in step, without a
//! multi-statement transaction.
//!
//! The ledger record is the source of truth; the counter is a cache
//! maintained with the store's atomic conditional update. When the two
//! disagree, ledger wins: a counter update whose precondition fails is
//! absorbed, so the counter can briefly under-report but never goes
//! negative and is never double-applied for one user.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::models::Like;
use crate::traits::{Collection, Mutation, Precondition, RecordStore};

/// Resulting membership state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
}

pub struct LikeEngine {
    store: Arc<dyn RecordStore>,
}

impl LikeEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Flips the `(post_id, username)` pair to the opposite of its current
    /// state and returns the new state.
    ///
    /// The read and the following writes are not linearizable as a unit:
    /// two racing toggles from one user can interleave between the
    /// membership read and the writes. The counter's precondition is the
    /// safety net against under/overflow; the membership put is an
    /// unconditional upsert, so a retried toggle converges instead of
    /// erroring. Retry after an unknown-outcome failure may flip the state
    /// again; the engine does not deduplicate by request id.
    pub async fn toggle(&self, post_id: &str, username: &str) -> Result<LikeOutcome> {
        let key = Like::storage_key(post_id, username);
        let currently_liked = self.store.get(Collection::Likes, &key).await?.is_some();

        if currently_liked {
            self.store.delete(Collection::Likes, &key).await?;
            self.bump_counter(post_id, -1, Precondition::AtLeast { field: "like_count", min: 1 })
                .await?;
            tracing::debug!(post_id, username, "like removed");
            Ok(LikeOutcome { liked: false })
        } else {
            let like = Like {
                post_id: post_id.to_string(),
                username: username.to_string(),
            };
            let record = serde_json::to_value(&like)
                .map_err(|e| StoreError::Unavailable(format!("encode like: {e}")))?;
            self.store.put(Collection::Likes, &key, record, false).await?;
            self.bump_counter(post_id, 1, Precondition::Exists).await?;
            tracing::debug!(post_id, username, "like recorded");
            Ok(LikeOutcome { liked: true })
        }
    }

    /// Membership lookup, no side effects.
    pub async fn has_liked(&self, post_id: &str, username: &str) -> Result<bool> {
        let key = Like::storage_key(post_id, username);
        Ok(self.store.get(Collection::Likes, &key).await?.is_some())
    }

    /// Adjusts the post counter, absorbing a failed precondition: the
    /// membership write has already happened and is not rolled back.
    /// Covers both the counter-at-zero decrement and an increment against
    /// a concurrently removed post.
    async fn bump_counter(
        &self,
        post_id: &str,
        delta: i64,
        precondition: Precondition,
    ) -> Result<()> {
        let mutation = Mutation::Adjust {
            field: "like_count",
            delta,
        };
        match self
            .store
            .conditional_update(Collection::Posts, post_id, mutation, precondition)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::PreconditionFailed(_)) => {
                tracing::debug!(post_id, delta, "counter update skipped, ledger wins");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
