//! # User Directory
//!
//! Username-keyed identity records with insert-if-absent semantics.
//! Registration is the only mutation path for users in this core; there
//! is no edit or delete.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{FeedError, Result, StoreError};
use crate::models::User;
use crate::traits::{Collection, RecordStore};

/// Usernames are part of composite like-keys, so the charset is locked
/// down at the door.
const MAX_USERNAME_LEN: usize = 32;

pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(FeedError::Validation(format!(
            "username must be 1-{MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(FeedError::Validation(
            "username may only contain letters, digits, '.', '_' and '-'".into(),
        ));
    }
    Ok(())
}

impl UserDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates a user record, failing with [`FeedError::UsernameTaken`] if
    /// the username is already registered. Never overwrites.
    pub async fn register(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User> {
        validate_username(username)?;

        let user = User {
            username: username.to_string(),
            display_name: display_name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let record = serde_json::to_value(&user)
            .map_err(|e| StoreError::Unavailable(format!("encode user: {e}")))?;

        match self
            .store
            .put(Collection::Users, username, record, true)
            .await
        {
            Ok(()) => {
                tracing::info!(username, "user registered");
                Ok(user)
            }
            Err(StoreError::AlreadyExists(_)) => {
                Err(FeedError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Direct lookup; absence is `Ok(None)`.
    pub async fn lookup(&self, username: &str) -> Result<Option<User>> {
        let record = self.store.get(Collection::Users, username).await?;
        record
            .map(|r| {
                serde_json::from_value(r)
                    .map_err(|e| StoreError::Unavailable(format!("decode user: {e}")).into())
            })
            .transpose()
    }
}
