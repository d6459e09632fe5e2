//! Error types for the semantic engine.

use snomed_store::StoreError;
use thiserror::Error;

/// Errors produced by semantic engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested concept (or other id) does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// `all_children` aborted because the visited set exceeded its capacity
    /// guard.
    #[error("too many children (limit {limit} exceeded)")]
    TooManyChildren {
        /// The configured capacity limit that was exceeded.
        limit: usize,
    },

    /// Localisation found no acceptable description for the requested
    /// concept/type/language combination.
    #[error("no description found")]
    NoDescription,

    /// `genericise_to_root` was called with a root that is not an ancestor
    /// of the concept.
    #[error("root is not an ancestor of the concept")]
    RootNotAncestor,

    /// The operation was cancelled via a cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The underlying Component Store / Index Layer reported an error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
