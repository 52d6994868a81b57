//! Face swap submission error types.

use thiserror::Error;

/// Message shown when the server rejects a request without a detail.
pub const GENERIC_SWAP_FAILURE: &str = "Face swap failed";

/// Face swap error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SwapError {
    #[error("Please select an image first")]
    NoSourceSelected,

    /// Server-provided detail, shown verbatim.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("{}", GENERIC_SWAP_FAILURE)]
    Failed { status: u16 },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected response from face swap service: {message}")]
    InvalidResponse { message: String },

    #[error("failed to build request: {message}")]
    Request { message: String },
}

impl SwapError {
    /// Creates an error from a non-success status and optional server detail.
    #[must_use]
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match detail.filter(|d| !d.is_empty()) {
            Some(detail) => Self::Rejected { status, detail },
            None => Self::Failed { status },
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_shown_verbatim() {
        let err = SwapError::from_status(400, Some("too many faces".to_string()));
        assert_eq!(err.to_string(), "too many faces");
    }

    #[test]
    fn test_missing_detail_is_generic() {
        assert_eq!(SwapError::from_status(500, None).to_string(), GENERIC_SWAP_FAILURE);
        assert_eq!(
            SwapError::from_status(500, Some(String::new())).to_string(),
            GENERIC_SWAP_FAILURE
        );
    }
}
