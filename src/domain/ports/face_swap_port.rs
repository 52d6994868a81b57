//! Face swap service port definition.

use async_trait::async_trait;

use crate::domain::entities::{EffectiveTarget, SourceImage, SwapResult};
use crate::domain::errors::SwapError;

/// Multipart field carrying the source photo.
pub const SOURCE_IMAGE_FIELD: &str = "source_image";
/// Multipart field carrying a custom target photo.
pub const TARGET_IMAGE_FIELD: &str = "target_image";
/// Multipart field carrying a predefined style name.
pub const TARGET_TYPE_FIELD: &str = "target_type";

/// One face swap submission.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    /// Source photo.
    pub source: SourceImage,
    /// Resolved target; at most one target field is ever sent.
    pub target: EffectiveTarget,
}

impl SwapRequest {
    /// Creates new request.
    #[must_use]
    pub const fn new(source: SourceImage, target: EffectiveTarget) -> Self {
        Self { source, target }
    }

    /// Returns the multipart field names this request will carry, in order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = vec![SOURCE_IMAGE_FIELD];
        match self.target {
            EffectiveTarget::None => {}
            EffectiveTarget::Template(_) => fields.push(TARGET_TYPE_FIELD),
            EffectiveTarget::Custom(_) => fields.push(TARGET_IMAGE_FIELD),
        }
        fields
    }
}

/// Port for the remote face swap service.
#[async_trait]
pub trait FaceSwapPort: Send + Sync {
    /// Submits a swap and returns the generated result.
    async fn swap(&self, request: SwapRequest) -> Result<SwapResult, SwapError>;
}


#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::entities::TargetStyle;

    fn source() -> SourceImage {
        SourceImage::from_file(Path::new("me.jpg"), vec![1_u8, 2, 3]).unwrap()
    }

    #[test]
    fn test_fields_without_target() {
        let request = SwapRequest::new(source(), EffectiveTarget::None);
        assert_eq!(request.field_names(), vec![SOURCE_IMAGE_FIELD]);
    }

    #[test]
    fn test_fields_with_template() {
        let request = SwapRequest::new(source(), EffectiveTarget::Template(TargetStyle::Male));
        assert_eq!(
            request.field_names(),
            vec![SOURCE_IMAGE_FIELD, TARGET_TYPE_FIELD]
        );
    }

    #[test]
    fn test_fields_with_custom_target() {
        let request = SwapRequest::new(source(), EffectiveTarget::Custom(source()));
        assert_eq!(
            request.field_names(),
            vec![SOURCE_IMAGE_FIELD, TARGET_IMAGE_FIELD]
        );
    }
}
