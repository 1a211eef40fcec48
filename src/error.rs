//! Error kinds surfaced by the matching and history core.
//!
//! None of these are fatal: callers log them and degrade to "no match", an
//! empty history, or an omitted report.

use thiserror::Error;

pub type WineResult<T> = std::result::Result<T, WineError>;

#[derive(Error, Debug)]
pub enum WineError {
    /// Detected text was missing or not a string.
    #[error("invalid input: {0}")]
    InvalidInputKind(String),

    /// History could not be read from or written to the backend.
    #[error("history storage unavailable for '{id}': {source}")]
    StorageUnavailable {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// No sensor values or no history to evaluate.
    #[error("missing data: {0}")]
    MissingData(String),
}

impl WineError {
    pub fn storage(id: &str, source: anyhow::Error) -> Self {
        WineError::StorageUnavailable {
            id: id.to_string(),
            source,
        }
    }
}
