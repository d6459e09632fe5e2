//! Error types for the Component Store and Index Layer.

use snomed_kv::KvError;
use thiserror::Error;

/// Errors produced by the Component Store / Index Layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested component does not exist.
    #[error("component not found: {0}")]
    NotFound(String),

    /// The underlying KV store reported an error.
    #[error(transparent)]
    Kv(#[from] KvError),

    /// A stored row failed to decode; the database is corrupt or was
    /// written by an incompatible schema version.
    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// The operation was cancelled via a cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

/// A result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
