//! HTTP clients for the face-swap and history services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{ErrorResponse, SwapResponse};
use crate::domain::entities::{EffectiveTarget, HistoryEntry, SourceImage, SwapResult, entries_from_payload};
use crate::domain::errors::{HistoryError, SwapError};
use crate::domain::ports::{
    FaceSwapPort, HistoryPort, SOURCE_IMAGE_FIELD, SwapRequest, TARGET_IMAGE_FIELD,
    TARGET_TYPE_FIELD,
};

const USER_AGENT: &str = concat!("faceswap-tui/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client. No timeout unless one is configured.
///
/// # Errors
/// Returns the reqwest builder error text.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, String> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| format!("failed to create HTTP client: {e}"))
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "failed to connect to server".to_string()
    } else {
        e.to_string()
    }
}

/// Face swap service client.
pub struct FaceSwapClient {
    client: Client,
    url: String,
}

impl FaceSwapClient {
    /// Creates a client posting to `url`.
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn image_part(image: &SourceImage) -> Result<Part, SwapError> {
        Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime())
            .map_err(|e| SwapError::Request {
                message: e.to_string(),
            })
    }

    /// Builds the multipart body. Never carries both target fields.
    fn build_form(request: &SwapRequest) -> Result<Form, SwapError> {
        let form = Form::new().part(SOURCE_IMAGE_FIELD, Self::image_part(&request.source)?);

        let form = match &request.target {
            EffectiveTarget::None => form,
            EffectiveTarget::Template(style) => form.text(TARGET_TYPE_FIELD, style.as_str()),
            EffectiveTarget::Custom(image) => form.part(TARGET_IMAGE_FIELD, Self::image_part(image)?),
        };

        Ok(form)
    }

    async fn handle_error_response(status: u16, response: reqwest::Response) -> SwapError {
        let detail = match response.json::<ErrorResponse>().await {
            Ok(body) => body.detail,
            Err(e) => {
                debug!(error = %e, "Error response had no JSON body");
                None
            }
        };
        SwapError::from_status(status, detail)
    }
}

#[async_trait]
impl FaceSwapPort for FaceSwapClient {
    async fn swap(&self, request: SwapRequest) -> Result<SwapResult, SwapError> {
        let fields = request.field_names();
        let form = Self::build_form(&request)?;

        debug!(url = %self.url, ?fields, "Posting face swap request");

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach face swap service");
                SwapError::network(describe_transport_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status.as_u16(), response).await);
        }

        let body: SwapResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse face swap response");
            SwapError::invalid_response(e.to_string())
        })?;

        Ok(body.into())
    }
}

/// History listing client.
pub struct HistoryClient {
    client: Client,
    url: String,
}

impl HistoryClient {
    /// Creates a client reading from `url`.
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HistoryPort for HistoryClient {
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        debug!(url = %self.url, "Fetching history");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach history service");
            HistoryError::network(describe_transport_error(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| HistoryError::Decode {
            message: e.to_string(),
        })?;

        Ok(entries_from_payload(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TargetStyle;
    use std::path::Path;

    fn source() -> SourceImage {
        SourceImage::from_file(Path::new("me.png"), b"\x89PNG\r\n\x1a\n".to_vec()).unwrap()
    }

    #[test]
    fn test_build_form_variants() {
        for target in [
            EffectiveTarget::None,
            EffectiveTarget::Template(TargetStyle::Muslimah),
            EffectiveTarget::Custom(source()),
        ] {
            let request = SwapRequest::new(source(), target);
            assert!(FaceSwapClient::build_form(&request).is_ok());
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(build_http_client(None).is_ok());
        assert!(build_http_client(Some(Duration::from_secs(5))).is_ok());
    }
}
