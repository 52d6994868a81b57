//! History listing error types.

use thiserror::Error;

/// History fetch error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum HistoryError {
    #[error("API request failed with status {status}")]
    Status { status: u16 },

    #[error("Failed to fetch data: {message}")]
    Network { message: String },

    #[error("Failed to fetch data: invalid JSON ({message})")]
    Decode { message: String },
}

impl HistoryError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}
