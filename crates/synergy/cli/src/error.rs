//! CLI error types

use synergy_state::StateError;
use synergy_types::TypesError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A feed line that does not decode to an action
    #[error("Feed line {line}: {source}")]
    Feed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The state machine refused the feed as a whole
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// An action that cannot be fingerprinted
    #[error("Types error: {0}")]
    Types(#[from] TypesError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
