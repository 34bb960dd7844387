//! Document store access
//!
//! The verifier only ever needs one operation from either store: "find the
//! documents matching this filter, with this projection". [`DocumentStore`]
//! captures exactly that boundary so the reconciliation logic can be
//! exercised against an in-memory store in tests.

use async_trait::async_trait;
use mongodb::bson::Document;
use thiserror::Error;

mod mongo;

pub use mongo::MongoStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach or authenticate against the store.
    #[error("failed to connect to document store: {0}")]
    Connect(String),

    /// A query against a collection failed.
    #[error("query against collection '{collection}' failed: {message}")]
    Query {
        collection: String,
        message: String,
    },
}

/// Read-only access to a collection-oriented document store.
///
/// Both stores are treated as snapshots for the duration of a run; no
/// write operations exist on this trait by design.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find all documents in `collection` matching `filter`.
    ///
    /// `projection` limits the fields fetched; implementations may return
    /// more fields than projected, never fewer. Result order is
    /// unspecified.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> StoreResult<Vec<Document>>;

    /// Find at most one document in `collection` matching `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> StoreResult<Option<Document>>;
}
