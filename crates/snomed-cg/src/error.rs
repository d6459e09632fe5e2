//! Structured parse errors for the CG grammar, in the same shape the
//! teacher's RF2 parser uses for its own row-level errors.

use thiserror::Error;

/// A structured syntax error produced while parsing a CG expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("CG parse error at {line}:{column} (near {offending_token:?}): {message}")]
pub struct ParseError {
    /// 1-based line number of the error.
    pub line: usize,
    /// 1-based column number of the error.
    pub column: usize,
    /// The token text at which parsing failed, if any was consumed.
    pub offending_token: Option<String>,
    /// A human-readable description of the problem.
    pub message: String,
}

/// A result alias for CG parsing.
pub type CgResult<T> = Result<T, ParseError>;
