//! Error type composing every crate this binary drives, per spec.md §7.

use thiserror::Error;

/// Errors raised by the `snomed-server` CLI.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The persisted `sctdb.json` descriptor does not match the running
    /// binary's compiled store/search kind, per spec.md §6.
    #[error(
        "incompatible database at {path}: on-disk store={on_disk_store}/search={on_disk_search}, \
         binary expects store={expected_store}/search={expected_search}"
    )]
    IncompatibleDatabase {
        path: String,
        on_disk_store: String,
        on_disk_search: String,
        expected_store: String,
        expected_search: String,
    },

    /// No `sctdb.json` found and the command was not allowed to create one.
    #[error("no database found at {0}; run `import` first")]
    DatabaseNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed database descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error(transparent)]
    Kv(#[from] snomed_kv::KvError),

    #[error(transparent)]
    Store(#[from] snomed_store::StoreError),

    #[error(transparent)]
    Engine(#[from] snomed_engine::EngineError),

    #[error(transparent)]
    Ecl(#[from] snomed_ecl::EclError),

    #[error(transparent)]
    Search(#[from] snomed_search::SearchError),

    #[error(transparent)]
    Cg(#[from] snomed_cg::ParseError),

    #[error(transparent)]
    Import(#[from] snomed_loader::Rf2Error),

    #[error("invalid SCTID: {0}")]
    InvalidSctId(String),
}

/// A result alias for CLI command handlers.
pub type ServiceResult<T> = Result<T, ServiceError>;
