//! Error types for the KV abstraction.

use thiserror::Error;

/// Errors produced by a [`crate::KvStore`] implementation.
#[derive(Debug, Error)]
pub enum KvError {
    /// The underlying storage engine reported a failure.
    #[error("storage engine error: {0}")]
    Engine(String),

    /// An I/O error occurred opening or writing the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted database descriptor does not match the requested
    /// store/search kind or schema version.
    #[error("incompatible database: {0}")]
    IncompatibleDatabase(String),

    /// The operation was cancelled via a cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

/// A result alias for KV operations.
pub type KvResult<T> = Result<T, KvError>;

#[cfg(feature = "redb")]
impl From<redb::Error> for KvError {
    fn from(e: redb::Error) -> Self {
        KvError::Engine(e.to_string())
    }
}

#[cfg(feature = "redb")]
impl From<redb::DatabaseError> for KvError {
    fn from(e: redb::DatabaseError) -> Self {
        KvError::Engine(e.to_string())
    }
}

#[cfg(feature = "redb")]
impl From<redb::TransactionError> for KvError {
    fn from(e: redb::TransactionError) -> Self {
        KvError::Engine(e.to_string())
    }
}

#[cfg(feature = "redb")]
impl From<redb::TableError> for KvError {
    fn from(e: redb::TableError) -> Self {
        KvError::Engine(e.to_string())
    }
}

#[cfg(feature = "redb")]
impl From<redb::StorageError> for KvError {
    fn from(e: redb::StorageError) -> Self {
        KvError::Engine(e.to_string())
    }
}

#[cfg(feature = "redb")]
impl From<redb::CommitError> for KvError {
    fn from(e: redb::CommitError) -> Self {
        KvError::Engine(e.to_string())
    }
}
