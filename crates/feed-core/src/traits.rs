//! # Record Store Port
//!
//! Storage contract the engagement layers are written against. Adapters
//! live in `crates/feed-plugins` and must implement this trait to be
//! wired into a binary.
//!
//! Records cross the port as JSON values; the semantic layers own the
//! typed models and (de)serialize at this edge. Mutations and
//! preconditions are data, not closures, so a shared backend can execute
//! a conditional update server-side in a single atomic statement instead
//! of a client-side read-modify-write.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Wire form of a stored record.
pub type Record = serde_json::Value;

/// The three independent collections owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Posts,
    Likes,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Posts, Collection::Likes];

    /// Stable name, used for table names and log fields.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Likes => "likes",
        }
    }
}

/// Mutation applied by [`RecordStore::conditional_update`].
#[derive(Debug, Clone, Copy)]
pub enum Mutation {
    /// Add `delta` to an integer field (negative delta decrements).
    Adjust { field: &'static str, delta: i64 },
}

/// Guard checked against the *current* stored state at the instant the
/// mutation is applied.
#[derive(Debug, Clone, Copy)]
pub enum Precondition {
    /// The record exists.
    Exists,
    /// The record exists and its integer field is at least `min`.
    AtLeast { field: &'static str, min: i64 },
}

/// Data persistence contract for the three engagement collections.
///
/// `conditional_update` must be atomic with respect to concurrent callers
/// on the same key: two updates whose preconditions cannot both hold must
/// never both apply.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup. Absence is `Ok(None)`, never an error.
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Record>>;

    /// Upsert, or insert-if-absent when `require_absent` is set (failing
    /// with [`crate::error::StoreError::AlreadyExists`]).
    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: Record,
        require_absent: bool,
    ) -> StoreResult<()>;

    /// Idempotent delete; deleting an absent key succeeds.
    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<()>;

    /// Apply `mutation` iff `precondition` holds against the stored record
    /// at apply time; fail with
    /// [`crate::error::StoreError::PreconditionFailed`] otherwise, leaving
    /// the record untouched.
    async fn conditional_update(
        &self,
        collection: Collection,
        key: &str,
        mutation: Mutation,
        precondition: Precondition,
    ) -> StoreResult<()>;

    /// Full enumeration, no ordering guarantee. Listing callers impose
    /// their own order client-side.
    async fn scan(&self, collection: Collection) -> StoreResult<Vec<Record>>;

    /// Filtered enumeration. The default is a full scan with client-side
    /// filtering; adapters may override but callers must not assume the
    /// cost is sub-linear.
    async fn query(
        &self,
        collection: Collection,
        filter: &(dyn for<'a> Fn(&'a Record) -> bool + Send + Sync),
    ) -> StoreResult<Vec<Record>> {
        let records = self.scan(collection).await?;
        Ok(records.into_iter().filter(|r| filter(r)).collect())
    }
}
