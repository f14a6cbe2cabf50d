//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `SharedError`.
pub type SharedResult<T> = Result<T, SharedError>;

/// Errors raised by the shared crate.
#[derive(Debug, Error)]
pub enum SharedError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A boundary value failed to parse.
    #[error("Parse error: {0}")]
    Parse(String),
}
