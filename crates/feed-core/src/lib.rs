//! feed-core
//!
//! Domain logic and storage contracts for the engagement persistence
//! layer: users, posts, and the like ledger with its denormalized
//! counter. Store adapters live in `crates/feed-plugins`.

pub mod directory;
pub mod engagement;
pub mod error;
pub mod ledger;
pub mod models;
pub mod service;
pub mod traits;

// Re-exporting for easier access in adapter crates and binaries
pub use engagement::LikeOutcome;
pub use error::{FeedError, Result, StoreError, StoreResult};
pub use models::{Like, Post, User};
pub use service::FeedService;
pub use traits::{Collection, Mutation, Precondition, Record, RecordStore};
