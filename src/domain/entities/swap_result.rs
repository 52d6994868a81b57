//! Face swap result.

/// Successful face swap response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    /// URL of the generated image.
    pub result_url: String,
    /// Number of faces the server detected.
    pub face_count: u32,
    /// Template the server applied, if it reported one.
    pub target_used: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl SwapResult {
    /// Returns "`N face(s) detected`" text.
    #[must_use]
    pub fn faces_label(&self) -> String {
        let noun = if self.face_count > 1 { "faces" } else { "face" };
        format!("{} {noun} detected", self.face_count)
    }

    /// Returns "`Using: ...`" text when the server reported a template.
    #[must_use]
    pub fn target_label(&self) -> Option<String> {
        self.target_used
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Using: {t}"))
    }
}
