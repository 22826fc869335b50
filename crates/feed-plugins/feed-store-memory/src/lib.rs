//! # feed-store-memory
//!
//! In-process `RecordStore` backed by `DashMap`, one map per collection.
//! Per-key atomicity for `put(require_absent)` and `conditional_update`
//! comes from the entry API, which holds the shard lock for the duration
//! of the check-and-mutate. Used by the test suite and single-process
//! deployments; nothing survives a restart.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use feed_core::error::{StoreError, StoreResult};
use feed_core::traits::{Collection, Mutation, Precondition, Record, RecordStore};

#[derive(Default)]
pub struct MemoryRecordStore {
    users: DashMap<String, Record>,
    posts: DashMap<String, Record>,
    likes: DashMap<String, Record>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, collection: Collection) -> &DashMap<String, Record> {
        match collection {
            Collection::Users => &self.users,
            Collection::Posts => &self.posts,
            Collection::Likes => &self.likes,
        }
    }
}

fn int_field(record: &Record, field: &str) -> Option<i64> {
    record.get(field).and_then(|v| v.as_i64())
}

fn precondition_holds(record: &Record, precondition: Precondition) -> bool {
    match precondition {
        Precondition::Exists => true,
        Precondition::AtLeast { field, min } => {
            int_field(record, field).is_some_and(|v| v >= min)
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Record>> {
        Ok(self.map(collection).get(key).map(|r| r.value().clone()))
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: Record,
        require_absent: bool,
    ) -> StoreResult<()> {
        let map = self.map(collection);
        if require_absent {
            match map.entry(key.to_string()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::AlreadyExists(format!(
                        "{}/{key}",
                        collection.name()
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        } else {
            map.insert(key.to_string(), record);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        self.map(collection).remove(key);
        Ok(())
    }

    async fn conditional_update(
        &self,
        collection: Collection,
        key: &str,
        mutation: Mutation,
        precondition: Precondition,
    ) -> StoreResult<()> {
        // The occupied entry keeps the shard locked across the check and
        // the mutation, so concurrent updates on one key serialize here.
        match self.map(collection).entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if !precondition_holds(record, precondition) {
                    return Err(StoreError::PreconditionFailed(format!(
                        "{}/{key}",
                        collection.name()
                    )));
                }
                let Mutation::Adjust { field, delta } = mutation;
                let Some(current) = int_field(record, field) else {
                    return Err(StoreError::PreconditionFailed(format!(
                        "{}/{key}: no integer field {field}",
                        collection.name()
                    )));
                };
                record[field] = (current + delta).into();
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::PreconditionFailed(format!(
                "{}/{key}: absent",
                collection.name()
            ))),
        }
    }

    async fn scan(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        Ok(self
            .map(collection)
            .iter()
            .map(|r| r.value().clone())
            .collect())
    }
}
