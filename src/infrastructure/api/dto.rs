//! Wire types of the face-swap and history services.

use serde::Deserialize;

use crate::domain::entities::SwapResult;

/// Successful `POST /api/face-swap` body.
#[derive(Debug, Deserialize)]
pub struct SwapResponse {
    /// URL of the swapped image.
    pub result_url: String,
    /// Faces detected in the source.
    #[serde(default)]
    pub face_count: u32,
    /// Template the server applied, if any.
    #[serde(default)]
    pub target_used: Option<String>,
    /// Server status text.
    #[serde(default)]
    pub message: String,
}

impl From<SwapResponse> for SwapResult {
    fn from(response: SwapResponse) -> Self {
        Self {
            result_url: response.result_url,
            face_count: response.face_count,
            target_used: response.target_used,
            message: response.message,
        }
    }
}

/// Error body of the face-swap service.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure reason.
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_response_optional_fields() {
        let body = r#"{"result_url":"https://x/r.jpg","face_count":2,"message":"done"}"#;
        let result: SwapResult = serde_json::from_str::<SwapResponse>(body).unwrap().into();

        assert_eq!(result.face_count, 2);
        assert_eq!(result.target_used, None);
        assert_eq!(result.message, "done");
    }

    #[test]
    fn test_error_response_without_detail() {
        let body: ErrorResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(body.detail.is_none());
    }
}
