//! Capture and submit workflow state.

use tracing::{debug, info, warn};

use crate::application::use_cases::SubmitSwapUseCase;
use crate::domain::entities::{SourceImage, SwapResult, TargetSelection, TargetStyle};
use crate::domain::errors::SwapError;
use crate::domain::ports::SwapRequest;

/// Where the capture screen currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePhase {
    /// Nothing selected yet.
    Idle,
    /// A source is selected and can be submitted.
    Previewing,
    /// The camera is streaming.
    CameraActive,
    /// A submission is in flight.
    Submitting,
    /// The last submission succeeded and nothing newer is pending.
    Result,
    /// The last action failed; the message is shown in the alert region.
    Error(String),
}

/// Capture/submit state: one phase plus the selections that survive it.
///
/// The last successful result outlives errors, new picks and camera use;
/// only a newer success or a reset replaces it.
#[derive(Debug, Clone)]
pub struct CaptureWorkflow {
    phase: CapturePhase,
    source: Option<SourceImage>,
    target: TargetSelection,
    last_result: Option<SwapResult>,
}

impl CaptureWorkflow {
    /// Creates empty workflow.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Idle,
            source: None,
            target: TargetSelection::new(),
            last_result: None,
        }
    }

    /// Returns current phase.
    #[must_use]
    pub const fn phase(&self) -> &CapturePhase {
        &self.phase
    }

    /// Returns selected source.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Returns target selection.
    #[must_use]
    pub const fn target(&self) -> &TargetSelection {
        &self.target
    }

    /// Returns the last successful result.
    #[must_use]
    pub const fn result(&self) -> Option<&SwapResult> {
        self.last_result.as_ref()
    }

    /// Returns the alert message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            CapturePhase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Returns true while a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, CapturePhase::Submitting)
    }

    /// Returns true while the camera is streaming.
    #[must_use]
    pub const fn is_camera_active(&self) -> bool {
        matches!(self.phase, CapturePhase::CameraActive)
    }

    const fn settled_phase(&self) -> CapturePhase {
        if self.last_result.is_some() {
            CapturePhase::Result
        } else if self.source.is_some() {
            CapturePhase::Previewing
        } else {
            CapturePhase::Idle
        }
    }

    /// Replaces the source wholesale.
    pub fn select_source(&mut self, source: SourceImage) {
        info!(file = %source.file_name(), bytes = source.len(), "Source image selected");
        self.source = Some(source);
        self.phase = CapturePhase::Previewing;
    }

    /// Shows a local validation or device error without touching selections.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Capture action failed");
        self.phase = CapturePhase::Error(message);
    }

    /// Enters camera mode. Ignored while submitting.
    pub fn enter_camera(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.phase = CapturePhase::CameraActive;
        true
    }

    /// Leaves camera mode without a capture.
    pub fn leave_camera(&mut self) {
        if self.is_camera_active() {
            self.phase = self.settled_phase();
        }
    }

    /// Clears the alert.
    pub fn dismiss_error(&mut self) {
        if self.error().is_some() {
            self.phase = self.settled_phase();
        }
    }

    /// Selects a predefined style; ignored while the custom target is active.
    pub fn select_style(&mut self, style: TargetStyle) -> bool {
        let changed = self.target.select_style(style);
        if changed {
            debug!(style = %style, "Target style selected");
        }
        changed
    }

    /// Stores a custom target and switches to it.
    pub fn set_custom_target(&mut self, image: SourceImage) {
        info!(file = %image.file_name(), "Custom target selected");
        self.target.set_custom(image);
    }

    /// Removes the custom target.
    pub fn remove_custom_target(&mut self) {
        self.target.remove_custom();
    }

    /// Toggles between custom and predefined target.
    pub fn toggle_custom_target(&mut self) -> bool {
        self.target.toggle_custom()
    }

    /// Starts a submission.
    ///
    /// Returns `Ok(None)` when the trigger is ignored (already submitting or
    /// the camera is open).
    ///
    /// # Errors
    /// Returns `SwapError::NoSourceSelected` when nothing is selected; the
    /// phase moves to `Error` and no request is produced.
    pub fn begin_submit(&mut self) -> Result<Option<SwapRequest>, SwapError> {
        if matches!(
            self.phase,
            CapturePhase::Submitting | CapturePhase::CameraActive
        ) {
            return Ok(None);
        }

        match SubmitSwapUseCase::prepare(self.source.as_ref(), &self.target) {
            Ok(request) => {
                self.phase = CapturePhase::Submitting;
                Ok(Some(request))
            }
            Err(e) => {
                self.phase = CapturePhase::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Records the outcome of the in-flight submission.
    ///
    /// Returns true when a new result replaced the previous one.
    pub fn finish_submit(&mut self, outcome: Result<SwapResult, SwapError>) -> bool {
        if !self.is_submitting() {
            debug!("Ignoring submission outcome outside of Submitting");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.last_result = Some(result);
                self.phase = CapturePhase::Result;
                true
            }
            Err(e) => {
                self.phase = CapturePhase::Error(e.to_string());
                false
            }
        }
    }

    /// Returns to the initial empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("Capture workflow reset");
    }
}

impl Default for CaptureWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::entities::EffectiveTarget;
    use crate::domain::ports::{TARGET_IMAGE_FIELD, TARGET_TYPE_FIELD};

    fn image(name: &str) -> SourceImage {
        SourceImage::from_file(Path::new(name), vec![0_u8; 4]).unwrap()
    }

    fn result() -> SwapResult {
        SwapResult {
            result_url: "https://example.com/r.jpg".to_string(),
            face_count: 2,
            target_used: None,
            message: "done".to_string(),
        }
    }

    #[test]
    fn test_submit_without_source_is_blocked() {
        let mut workflow = CaptureWorkflow::new();

        let outcome = workflow.begin_submit();

        assert!(matches!(outcome, Err(SwapError::NoSourceSelected)));
        assert_eq!(workflow.error(), Some("Please select an image first"));
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        assert_eq!(workflow.phase(), &CapturePhase::Previewing);

        let request = workflow.begin_submit().unwrap();
        assert!(request.is_some());
        assert!(workflow.is_submitting());

        assert!(workflow.begin_submit().unwrap().is_none());

        assert!(workflow.finish_submit(Ok(result())));
        assert_eq!(workflow.phase(), &CapturePhase::Result);
        assert_eq!(workflow.result(), Some(&result()));
    }

    fn with_result() -> CaptureWorkflow {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        let _ = workflow.begin_submit();
        workflow.finish_submit(Ok(result()));
        workflow
    }

    #[test]
    fn test_failed_resubmit_keeps_previous_result() {
        let mut workflow = with_result();
        let _ = workflow.begin_submit();

        assert!(!workflow.finish_submit(Err(SwapError::network("boom"))));

        assert_eq!(workflow.error(), Some("network error: boom"));
        assert_eq!(workflow.result(), Some(&result()));

        workflow.dismiss_error();
        assert_eq!(workflow.phase(), &CapturePhase::Result);
    }

    #[test]
    fn test_rejected_pick_keeps_previous_result() {
        let mut workflow = with_result();

        workflow.fail("Please upload a valid image file (JPG, PNG)");
        workflow.dismiss_error();

        assert_eq!(workflow.phase(), &CapturePhase::Result);
        assert_eq!(workflow.result(), Some(&result()));
    }

    #[test]
    fn test_new_source_keeps_previous_result() {
        let mut workflow = with_result();

        workflow.select_source(image("other.png"));
        assert_eq!(workflow.phase(), &CapturePhase::Previewing);
        assert_eq!(workflow.result(), Some(&result()));

        assert!(workflow.enter_camera());
        workflow.leave_camera();
        assert_eq!(workflow.result(), Some(&result()));
    }

    #[test]
    fn test_newer_success_replaces_result() {
        let mut workflow = with_result();
        let newer = SwapResult {
            result_url: "https://example.com/second.jpg".to_string(),
            ..result()
        };
        let _ = workflow.begin_submit();

        assert!(workflow.finish_submit(Ok(newer.clone())));

        assert_eq!(workflow.result(), Some(&newer));
    }

    #[test]
    fn test_failed_submit_keeps_selection() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        workflow.select_style(TargetStyle::Male);
        let _ = workflow.begin_submit();

        workflow.finish_submit(Err(SwapError::from_status(
            400,
            Some("too many faces".to_string()),
        )));

        assert_eq!(workflow.error(), Some("too many faces"));
        assert!(workflow.source().is_some());
        assert_eq!(workflow.target().style(), TargetStyle::Male);

        workflow.dismiss_error();
        assert_eq!(workflow.phase(), &CapturePhase::Previewing);
    }

    #[test]
    fn test_custom_target_after_style_overrides_payload() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        workflow.select_style(TargetStyle::Female);
        workflow.set_custom_target(image("them.png"));

        let request = workflow.begin_submit().unwrap().unwrap();
        let fields = request.field_names();

        assert!(matches!(request.target, EffectiveTarget::Custom(_)));
        assert!(fields.contains(&TARGET_IMAGE_FIELD));
        assert!(!fields.contains(&TARGET_TYPE_FIELD));
    }

    #[test]
    fn test_default_style_never_sends_target_type() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        workflow.select_style(TargetStyle::Male);
        workflow.select_style(TargetStyle::Default);

        let request = workflow.begin_submit().unwrap().unwrap();

        assert!(!request.field_names().contains(&TARGET_TYPE_FIELD));
    }

    #[test]
    fn test_camera_blocks_submission() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        assert!(workflow.enter_camera());
        assert!(workflow.begin_submit().unwrap().is_none());

        workflow.leave_camera();
        assert_eq!(workflow.phase(), &CapturePhase::Previewing);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut workflow = CaptureWorkflow::new();
        workflow.select_source(image("me.jpg"));
        workflow.set_custom_target(image("them.png"));
        let _ = workflow.begin_submit();
        workflow.finish_submit(Ok(result()));

        workflow.reset();

        assert_eq!(workflow.phase(), &CapturePhase::Idle);
        assert!(workflow.result().is_none());
        assert!(workflow.source().is_none());
        assert!(workflow.target().custom().is_none());
        assert_eq!(workflow.target().style(), TargetStyle::Default);
    }
}
