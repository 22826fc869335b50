//! # feed-store-sqlite
//!
//! Durable `RecordStore` on SQLite via sqlx. This module implements the
//! data mapping between the relational tables and the `feed-core` domain
//! models; records cross the port as JSON and are bound to typed columns
//! here.
//!
//! `conditional_update` compiles to a single `UPDATE .. WHERE` statement,
//! so the precondition check and the mutation are one atomic server-side
//! operation even when several processes share the database file.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_core::error::{StoreError, StoreResult};
use feed_core::models::{Like, Post, User};
use feed_core::traits::{Collection, Mutation, Precondition, Record, RecordStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

pub struct SqliteRecordStore {
    pool: SqlitePool,
}

fn store_err(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn decode_err(collection: Collection, e: &str) -> StoreError {
    StoreError::Unavailable(format!("decode {} record: {e}", collection.name()))
}

fn encode(collection: Collection, value: impl serde::Serialize) -> StoreResult<Record> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::Unavailable(format!("encode {} record: {e}", collection.name())))
}

impl SqliteRecordStore {
    /// Connects (creating the database file if needed) and ensures the
    /// schema exists.
    pub async fn new(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_err)?
            .create_if_missing(true);
        // In-memory databases are per-connection; a single-connection pool
        // keeps tests against `sqlite::memory:` coherent.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        for ddl in [
            "CREATE TABLE IF NOT EXISTS users (
                username     TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS posts (
                post_id      TEXT PRIMARY KEY,
                author       TEXT NOT NULL,
                author_display_name TEXT NOT NULL,
                content      TEXT NOT NULL,
                like_count   INTEGER NOT NULL DEFAULT 0,
                created_at   TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS likes (
                like_key     TEXT PRIMARY KEY,
                post_id      TEXT NOT NULL,
                username     TEXT NOT NULL
            )",
        ] {
            sqlx::query(ddl).execute(&pool).await.map_err(store_err)?;
        }

        Ok(Self { pool })
    }

    async fn insert(
        &self,
        collection: Collection,
        key: &str,
        record: &Record,
        verb: &str,
    ) -> Result<(), sqlx::Error> {
        match collection {
            Collection::Users => {
                let user: User =
                    serde_json::from_value(record.clone()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                sqlx::query(&format!(
                    "{verb} INTO users (username, display_name, password_hash, created_at) VALUES (?, ?, ?, ?)"
                ))
                .bind(user.username)
                .bind(user.display_name)
                .bind(user.password_hash)
                .bind(user.created_at)
                .execute(&self.pool)
                .await?;
            }
            Collection::Posts => {
                let post: Post =
                    serde_json::from_value(record.clone()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                sqlx::query(&format!(
                    "{verb} INTO posts (post_id, author, author_display_name, content, like_count, created_at) VALUES (?, ?, ?, ?, ?, ?)"
                ))
                .bind(post.post_id)
                .bind(post.author)
                .bind(post.author_display_name)
                .bind(post.content)
                .bind(post.like_count)
                .bind(post.created_at)
                .execute(&self.pool)
                .await?;
            }
            Collection::Likes => {
                let like: Like =
                    serde_json::from_value(record.clone()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                sqlx::query(&format!(
                    "{verb} INTO likes (like_key, post_id, username) VALUES (?, ?, ?)"
                ))
                .bind(key)
                .bind(like.post_id)
                .bind(like.username)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        username: row.get("username"),
        display_name: row.get("display_name"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        post_id: row.get("post_id"),
        author: row.get("author"),
        author_display_name: row.get("author_display_name"),
        content: row.get("content"),
        like_count: row.get("like_count"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn like_from_row(row: &sqlx::sqlite::SqliteRow) -> Like {
    Like {
        post_id: row.get("post_id"),
        username: row.get("username"),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Record>> {
        let sql = match collection {
            Collection::Users => "SELECT * FROM users WHERE username = ?",
            Collection::Posts => "SELECT * FROM posts WHERE post_id = ?",
            Collection::Likes => "SELECT * FROM likes WHERE like_key = ?",
        };
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        row.map(|row| match collection {
            Collection::Users => encode(collection, user_from_row(&row)),
            Collection::Posts => encode(collection, post_from_row(&row)),
            Collection::Likes => encode(collection, like_from_row(&row)),
        })
        .transpose()
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        record: Record,
        require_absent: bool,
    ) -> StoreResult<()> {
        let verb = if require_absent { "INSERT" } else { "INSERT OR REPLACE" };
        match self.insert(collection, key, &record, verb).await {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::AlreadyExists(format!("{}/{key}", collection.name())),
            ),
            Err(sqlx::Error::Decode(e)) => Err(decode_err(collection, &e.to_string())),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        let sql = match collection {
            Collection::Users => "DELETE FROM users WHERE username = ?",
            Collection::Posts => "DELETE FROM posts WHERE post_id = ?",
            Collection::Likes => "DELETE FROM likes WHERE like_key = ?",
        };
        sqlx::query(sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn conditional_update(
        &self,
        collection: Collection,
        key: &str,
        mutation: Mutation,
        precondition: Precondition,
    ) -> StoreResult<()> {
        let Mutation::Adjust { field, delta } = mutation;
        if collection != Collection::Posts || field != "like_count" {
            return Err(StoreError::Unavailable(format!(
                "unsupported conditional update on {}.{field}",
                collection.name()
            )));
        }

        let result = match precondition {
            Precondition::Exists => {
                sqlx::query("UPDATE posts SET like_count = like_count + ? WHERE post_id = ?")
                    .bind(delta)
                    .bind(key)
                    .execute(&self.pool)
                    .await
            }
            Precondition::AtLeast { field: guard, min } => {
                if guard != "like_count" {
                    return Err(StoreError::Unavailable(format!(
                        "unsupported precondition field posts.{guard}"
                    )));
                }
                sqlx::query(
                    "UPDATE posts SET like_count = like_count + ? WHERE post_id = ? AND like_count >= ?",
                )
                .bind(delta)
                .bind(key)
                .bind(min)
                .execute(&self.pool)
                .await
            }
        };

        let outcome = result.map_err(store_err)?;
        if outcome.rows_affected() == 0 {
            return Err(StoreError::PreconditionFailed(format!(
                "posts/{key}"
            )));
        }
        Ok(())
    }

    async fn scan(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let sql = match collection {
            Collection::Users => "SELECT * FROM users",
            Collection::Posts => "SELECT * FROM posts",
            Collection::Likes => "SELECT * FROM likes",
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter()
            .map(|row| match collection {
                Collection::Users => encode(collection, user_from_row(row)),
                Collection::Posts => encode(collection, post_from_row(row)),
                Collection::Likes => encode(collection, like_from_row(row)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn memory_store() -> SqliteRecordStore {
        SqliteRecordStore::new("sqlite::memory:").await.unwrap()
    }

    fn sample_post(post_id: &str, like_count: i64) -> Record {
        serde_json::to_value(Post {
            post_id: post_id.into(),
            author: "alice".into(),
            author_display_name: "Alice".into(),
            content: "hello".into(),
            like_count,
            created_at: Utc::now(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn user_round_trip_and_uniqueness() {
        let store = memory_store().await;
        let user = serde_json::to_value(User {
            username: "alice".into(),
            display_name: "Alice".into(),
            password_hash: "$argon2$...".into(),
            created_at: Utc::now(),
        })
        .unwrap();

        store
            .put(Collection::Users, "alice", user.clone(), true)
            .await
            .unwrap();
        let err = store
            .put(Collection::Users, "alice", user, true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let stored = store.get(Collection::Users, "alice").await.unwrap().unwrap();
        assert_eq!(stored["display_name"], "Alice");
    }

    #[tokio::test]
    async fn counter_update_is_guarded() {
        let store = memory_store().await;
        store
            .put(Collection::Posts, "p1", sample_post("p1", 0), false)
            .await
            .unwrap();

        store
            .conditional_update(
                Collection::Posts,
                "p1",
                Mutation::Adjust { field: "like_count", delta: 1 },
                Precondition::Exists,
            )
            .await
            .unwrap();

        let dec = Mutation::Adjust { field: "like_count", delta: -1 };
        let floor = Precondition::AtLeast { field: "like_count", min: 1 };
        store
            .conditional_update(Collection::Posts, "p1", dec, floor)
            .await
            .unwrap();
        let err = store
            .conditional_update(Collection::Posts, "p1", dec, floor)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed(_)));

        let post = store.get(Collection::Posts, "p1").await.unwrap().unwrap();
        assert_eq!(post["like_count"], 0);
    }

    #[tokio::test]
    async fn like_rows_key_by_pair() {
        let store = memory_store().await;
        let like = serde_json::to_value(Like {
            post_id: "p1".into(),
            username: "bob".into(),
        })
        .unwrap();
        let key = Like::storage_key("p1", "bob");

        store
            .put(Collection::Likes, &key, like, false)
            .await
            .unwrap();
        let stored = store.get(Collection::Likes, &key).await.unwrap().unwrap();
        assert_eq!(stored["username"], "bob");

        store.delete(Collection::Likes, &key).await.unwrap();
        store.delete(Collection::Likes, &key).await.unwrap();
        assert!(store.get(Collection::Likes, &key).await.unwrap().is_none());
    }
}
