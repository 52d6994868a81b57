//! Target style selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SourceImage;

/// Predefined target style offered by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStyle {
    /// Let the server pick; no template.
    #[default]
    Default,
    /// Female template.
    Female,
    /// Male template.
    Male,
    /// Muslimah template.
    Muslimah,
}

impl TargetStyle {
    /// All styles in display order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Female, Self::Male, Self::Muslimah];

    /// Returns the value sent as `target_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Female => "female",
            Self::Male => "male",
            Self::Muslimah => "muslimah",
        }
    }

    /// Returns display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Muslimah => "Muslimah",
        }
    }

    /// Returns the template asset file name, if the style has one.
    #[must_use]
    pub const fn template_asset(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Female => Some("AI_CBI_Female.png"),
            Self::Male => Some("AI_CBI_Male.png"),
            Self::Muslimah => Some("AI_CBI_Muslimah.png"),
        }
    }

    /// Returns the next style, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Default => Self::Female,
            Self::Female => Self::Male,
            Self::Male => Self::Muslimah,
            Self::Muslimah => Self::Default,
        }
    }

    /// Returns the previous style, wrapping around.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Default => Self::Muslimah,
            Self::Female => Self::Default,
            Self::Male => Self::Female,
            Self::Muslimah => Self::Male,
        }
    }
}

impl fmt::Display for TargetStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What will actually be sent as the swap target.
#[derive(Debug, Clone)]
pub enum EffectiveTarget {
    /// No target field at all.
    None,
    /// `target_type` with a predefined style.
    Template(TargetStyle),
    /// `target_image` with a custom upload.
    Custom(SourceImage),
}

/// Target selection state.
///
/// A custom target, while enabled, always wins over the predefined style and
/// locks the predefined controls.
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    style: TargetStyle,
    custom: Option<SourceImage>,
    use_custom: bool,
}

impl TargetSelection {
    /// Creates default selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns selected predefined style.
    #[must_use]
    pub const fn style(&self) -> TargetStyle {
        self.style
    }

    /// Returns custom target, if uploaded.
    #[must_use]
    pub const fn custom(&self) -> Option<&SourceImage> {
        self.custom.as_ref()
    }

    /// Returns whether the custom target is in effect.
    #[must_use]
    pub const fn uses_custom(&self) -> bool {
        self.use_custom && self.custom.is_some()
    }

    /// Returns whether the predefined controls accept input.
    #[must_use]
    pub const fn predefined_enabled(&self) -> bool {
        !self.uses_custom()
    }

    /// Selects a predefined style. Ignored while a custom target is in effect.
    ///
    /// Returns true if the selection changed.
    pub fn select_style(&mut self, style: TargetStyle) -> bool {
        if !self.predefined_enabled() || self.style == style {
            return false;
        }
        self.style = style;
        true
    }

    /// Stores a custom target and switches to it.
    pub fn set_custom(&mut self, image: SourceImage) {
        self.custom = Some(image);
        self.use_custom = true;
    }

    /// Removes the custom target, reverting to predefined mode.
    pub fn remove_custom(&mut self) {
        self.custom = None;
        self.use_custom = false;
    }

    /// Toggles between custom and predefined mode. No-op without a custom target.
    pub fn toggle_custom(&mut self) -> bool {
        if self.custom.is_none() {
            return false;
        }
        self.use_custom = !self.use_custom;
        true
    }

    /// Returns the template asset to preview, if any.
    #[must_use]
    pub const fn template_preview(&self) -> Option<&'static str> {
        if self.uses_custom() {
            return None;
        }
        self.style.template_asset()
    }

    /// Resolves what the submission will carry.
    #[must_use]
    pub fn effective(&self) -> EffectiveTarget {
        if self.uses_custom() {
            if let Some(custom) = &self.custom {
                return EffectiveTarget::Custom(custom.clone());
            }
        }
        match self.style {
            TargetStyle::Default => EffectiveTarget::None,
            style => EffectiveTarget::Template(style),
        }
    }
}
