//! Editor configuration.
//!
//! Every field has a default, so a host can pass a partial JSON object
//! (or none at all) and only override what it cares about.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};

/// Tunable limits and export settings for an editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Smallest width/height an element may be resized to, in canvas px. Default: **20**.
    pub min_element_size: f64,

    /// Smallest side of the crop box, in display px. Default: **50**.
    pub min_crop_size: f64,

    /// Side length of the square resize handles drawn at element and crop
    /// corners. Hit testing uses the same square. Default: **10**.
    pub handle_size: f64,

    /// Opacity of the black overlay for a fresh poster. Default: **0.3**.
    pub default_overlay_opacity: f64,

    /// DOM id of the subtree the render adapter captures on export.
    pub export_root: String,

    /// Pixel ratio requested from the render adapter. Default: **2.0**.
    pub export_scale: f64,

    /// Suggested download name for the exported bitmap.
    pub export_file_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_element_size: 20.0,
            min_crop_size: 50.0,
            handle_size: 10.0,
            default_overlay_opacity: 0.3,
            export_root: "poster-canvas".into(),
            export_scale: 2.0,
            export_file_name: "poster.png".into(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`EditorError::Config`] when the JSON is malformed or a field
    /// has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace non-finite or non-positive limits with the defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.min_element_size) {
            self.min_element_size = defaults.min_element_size;
        }
        if !positive(self.min_crop_size) {
            self.min_crop_size = defaults.min_crop_size;
        }
        if !positive(self.handle_size) {
            self.handle_size = defaults.handle_size;
        }
        if !positive(self.export_scale) {
            self.export_scale = defaults.export_scale;
        }
        if !self.default_overlay_opacity.is_finite() {
            self.default_overlay_opacity = defaults.default_overlay_opacity;
        }
        self.default_overlay_opacity = self.default_overlay_opacity.clamp(0.0, 1.0);
        self
    }
}
