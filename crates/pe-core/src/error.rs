//! Error type shared by the editor crates.

use crate::id::ElementId;
use thiserror::Error;

/// Failures of editor operations.
///
/// None of these are fatal: the editor stays usable after any of them and the
/// host is expected to surface the message as a notification.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no background image selected")]
    NoBackground,

    #[error("background image is not loaded yet")]
    BackgroundNotReady,

    #[error("background image failed to load: {0}")]
    BackgroundFailed(String),

    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    #[error("degenerate image size {width}x{height}")]
    DegenerateImage { width: f64, height: f64 },

    #[error("invalid aspect ratio {0}")]
    InvalidAspectRatio(f64),

    #[error("a pointer interaction is still active")]
    InteractionActive,

    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("crop mode is not active")]
    CropInactive,

    #[error("invalid value {value:?} for property `{key}`")]
    InvalidProperty { key: String, value: String },

    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}
