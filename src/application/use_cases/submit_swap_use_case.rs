//! Face swap submission use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{EffectiveTarget, SourceImage, SwapResult, TargetSelection};
use crate::domain::errors::SwapError;
use crate::domain::ports::{FaceSwapPort, SwapRequest};

/// Sends the selected source and target to the face swap service.
#[derive(Clone)]
pub struct SubmitSwapUseCase {
    swap_port: Arc<dyn FaceSwapPort>,
}

impl SubmitSwapUseCase {
    /// Creates new submit use case.
    #[must_use]
    pub const fn new(swap_port: Arc<dyn FaceSwapPort>) -> Self {
        Self { swap_port }
    }

    /// Builds the request from the current selection.
    ///
    /// # Errors
    /// Returns `SwapError::NoSourceSelected` when there is no source image.
    pub fn prepare(
        source: Option<&SourceImage>,
        target: &TargetSelection,
    ) -> Result<SwapRequest, SwapError> {
        let source = source.ok_or_else(|| {
            debug!("Submission blocked: no source image");
            SwapError::NoSourceSelected
        })?;

        Ok(SwapRequest::new(source.clone(), target.effective()))
    }

    /// Executes the submission.
    ///
    /// # Errors
    /// Returns error if the service rejects the request or is unreachable.
    pub async fn execute(&self, request: SwapRequest) -> Result<SwapResult, SwapError> {
        let target = match &request.target {
            EffectiveTarget::None => "default".to_string(),
            EffectiveTarget::Template(style) => style.to_string(),
            EffectiveTarget::Custom(image) => format!("custom:{}", image.file_name()),
        };
        debug!(
            source = %request.source.file_name(),
            bytes = request.source.len(),
            target = %target,
            "Submitting face swap"
        );

        let result = self.swap_port.swap(request).await.map_err(|e| {
            warn!(error = %e, "Face swap failed");
            e
        })?;

        info!(
            faces = result.face_count,
            target_used = result.target_used.as_deref().unwrap_or("-"),
            "Face swap completed"
        );

        Ok(result)
    }
}
