//! # Domain Models
//!
//! These structs represent the three entities of the engagement store.
//! Timestamps use UTC throughout; ordering of feed listings is derived
//! from `created_at`, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The username doubles as the primary key and is
/// immutable after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: String,
    /// Opaque credential material produced by the auth layer. This core
    /// never inspects or verifies it.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A published post. `like_count` is a denormalized aggregate over the
/// like ledger; the ledger is the source of truth and the counter is a
/// cache maintained by the like engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Caller-generated opaque identifier (the seed binary uses UUIDv7).
    pub post_id: String,
    /// Author username. A reference, not ownership: no cascading delete.
    pub author: String,
    /// Snapshot of the author's display name at publish time. Users have
    /// no edit path in this core, so it never drifts.
    pub author_display_name: String,
    pub content: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Ledger entry for "this user currently likes this post". Presence-only:
/// the composite key carries all the information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub post_id: String,
    pub username: String,
}

impl Like {
    /// Storage key for a `(post_id, username)` pair. Usernames are
    /// restricted to `[A-Za-z0-9._-]` at registration, so the separator
    /// cannot appear in them and the key is unambiguous.
    pub fn storage_key(post_id: &str, username: &str) -> String {
        format!("{post_id}::{username}")
    }

    pub fn key(&self) -> String {
        Self::storage_key(&self.post_id, &self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_key_is_stable() {
        let like = Like {
            post_id: "p1".into(),
            username: "alice".into(),
        };
        assert_eq!(like.key(), "p1::alice");
        assert_eq!(Like::storage_key("p1", "alice"), like.key());
    }

    #[test]
    fn post_round_trips_through_json() {
        let post = Post {
            post_id: "p1".into(),
            author: "alice".into(),
            author_display_name: "Alice".into(),
            content: "hello".into(),
            like_count: 3,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["like_count"], 3);
        let back: Post = serde_json::from_value(value).unwrap();
        assert_eq!(back, post);
    }
}
