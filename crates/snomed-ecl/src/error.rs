use thiserror::Error;

/// An unparseable ECL constraint string.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("ECL syntax error at {line}:{column} (near {offending_token:?}): {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub offending_token: Option<String>,
    pub message: String,
}

/// Errors raised while parsing or evaluating an ECL constraint.
#[derive(Debug, Error)]
pub enum EclError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Store(#[from] snomed_store::StoreError),
    #[error(transparent)]
    Engine(#[from] snomed_engine::EngineError),
}

pub type EclResult<T> = Result<T, EclError>;
