use thiserror::Error;

/// Errors produced by the Search Indexer.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Store(#[from] snomed_store::StoreError),

    #[error(transparent)]
    Engine(#[from] snomed_engine::EngineError),

    #[error("tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("failed to open search index directory: {0}")]
    OpenIndex(#[from] std::io::Error),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
