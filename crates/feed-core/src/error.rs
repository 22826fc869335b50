//! # Error Taxonomy
//!
//! Two layers of failure, mirroring the two layers of the crate:
//! [`StoreError`] for the record-store port, [`FeedError`] for the
//! domain operations built on top of it.
//!
//! Lookup misses are not errors anywhere in this crate; they are
//! `Option::None`.

use thiserror::Error;

/// Failures produced by a [`crate::traits::RecordStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A `put` with `require_absent` hit an existing key.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// A conditional update's precondition did not hold at apply time.
    /// The stored record was left untouched.
    #[error("precondition failed for {0}")]
    PreconditionFailed(String),

    /// Backend unreachable or misconfigured. Propagated to the boundary
    /// as a hard failure; never retried inside this core.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced to the request-handling collaborator.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Registration attempted with a username that is already taken.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Input rejected before reaching storage (bad username shape,
    /// oversized content).
    #[error("validation error: {0}")]
    Validation(String),

    /// Store-level failure bubbling up unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Specialized Result for domain operations.
pub type Result<T, E = FeedError> = std::result::Result<T, E>;

/// Specialized Result for store primitives.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
