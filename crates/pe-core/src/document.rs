//! The poster being edited: background, overlay, crop, output size and the
//! placed elements.

use crate::config::EditorConfig;
use crate::dimensions::CanvasDimensions;
use crate::error::EditorError;
use crate::geometry::{ImageMetrics, fit_centered};
use crate::model::ElementModel;
use kurbo::{Point, Rect, Size};

/// Lifecycle of the background photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BackgroundState {
    #[default]
    None,
    Loading {
        url: String,
    },
    Ready {
        url: String,
        metrics: ImageMetrics,
    },
    Failed {
        url: String,
        reason: String,
    },
}

impl BackgroundState {
    pub fn url(&self) -> Option<&str> {
        match self {
            BackgroundState::None => None,
            BackgroundState::Loading { url }
            | BackgroundState::Ready { url, .. }
            | BackgroundState::Failed { url, .. } => Some(url),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, BackgroundState::Ready { .. })
    }

    /// Metrics of a loaded background.
    ///
    /// # Errors
    /// Why the background cannot be used yet.
    pub fn metrics(&self) -> Result<ImageMetrics, EditorError> {
        match self {
            BackgroundState::None => Err(EditorError::NoBackground),
            BackgroundState::Loading { .. } => Err(EditorError::BackgroundNotReady),
            BackgroundState::Failed { reason, .. } => Err(EditorError::BackgroundFailed(reason.clone())),
            BackgroundState::Ready { metrics, .. } => Ok(*metrics),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosterDocument {
    pub elements: ElementModel,
    pub background: BackgroundState,
    /// Opacity of the black layer between background and elements, `[0, 1]`.
    pub overlay_opacity: f64,
    /// Applied crop in natural pixels of the background.
    pub committed_crop: Option<Rect>,
    pub dimensions: CanvasDimensions,
}

impl PosterDocument {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            elements: ElementModel::new(),
            background: BackgroundState::None,
            overlay_opacity: config.default_overlay_opacity.clamp(0.0, 1.0),
            committed_crop: None,
            dimensions: CanvasDimensions::default(),
        }
    }

    /// # Errors
    /// [`EditorError::InvalidProperty`] for NaN or infinite input; values
    /// outside `[0, 1]` are clamped.
    pub fn set_overlay_opacity(&mut self, opacity: f64) -> Result<(), EditorError> {
        if !opacity.is_finite() {
            return Err(EditorError::InvalidProperty {
                key: "overlayOpacity".into(),
                value: opacity.to_string(),
            });
        }
        self.overlay_opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    /// Start loading a new background. A committed crop belongs to the old
    /// photo and is dropped.
    pub fn begin_background(&mut self, url: &str) {
        log::debug!("background loading: {url}");
        self.background = BackgroundState::Loading { url: url.to_string() };
        self.committed_crop = None;
    }

    /// The photo at `url` finished loading. Its display size is fitted inside
    /// `container`. Returns `false` for a stale load (the background changed
    /// in the meantime).
    ///
    /// # Errors
    /// [`EditorError::DegenerateImage`]; the background is marked failed.
    pub fn finish_background(&mut self, url: &str, natural: Size, container: Size) -> Result<bool, EditorError> {
        if self.background.url() != Some(url) {
            log::debug!("ignoring stale background load: {url}");
            return Ok(false);
        }
        match ImageMetrics::fit_within(natural, container) {
            Ok(metrics) => {
                log::debug!("background ready: {url} natural={natural:?} display={:?}", metrics.display);
                self.background = BackgroundState::Ready {
                    url: url.to_string(),
                    metrics,
                };
                Ok(true)
            }
            Err(err) => {
                self.fail_background(url, &err.to_string());
                Err(err)
            }
        }
    }

    /// The photo at `url` could not be loaded. Stale failures are ignored.
    pub fn fail_background(&mut self, url: &str, reason: &str) {
        if self.background.url() != Some(url) {
            return;
        }
        log::warn!("background failed: {url}: {reason}");
        self.background = BackgroundState::Failed {
            url: url.to_string(),
            reason: reason.to_string(),
        };
    }

    /// Portion of the background photo (natural pixels) shown on a canvas of
    /// `canvas` size: the committed crop, or else the largest centred region
    /// with the canvas ratio ("cover").
    pub fn background_source(&self, canvas: Size) -> Option<Rect> {
        let BackgroundState::Ready { metrics, .. } = &self.background else {
            return None;
        };
        if let Some(crop) = self.committed_crop {
            return Some(crop);
        }
        let ratio = canvas.width / canvas.height;
        let natural = Rect::from_origin_size(Point::ZERO, metrics.natural);
        if !(ratio.is_finite() && ratio > 0.0) {
            return Some(natural);
        }
        Some(fit_centered(natural, ratio))
    }
}
