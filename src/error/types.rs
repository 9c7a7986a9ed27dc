use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the masonry engine crate.
pub type Result<T> = std::result::Result<T, MasonryError>;

/// Errors surfaced to callers of the masonry engine.
#[derive(Debug, Error)]
pub enum MasonryError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid engine settings: {0}")]
    Config(#[from] serde_json::Error),
    #[error("logging failure: {0}")]
    Logging(#[from] LoggingError),
}
