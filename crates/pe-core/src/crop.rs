//! Aspect-ratio locked crop box over the background photo.
//!
//! The box lives in *display* space of the background image (origin at the
//! image's top-left). Two invariants hold after every operation:
//!
//! - `width / height == ratio` (up to float rounding);
//! - the box lies inside `[0, display.width] × [0, display.height]`.
//!
//! Only [`CropSession::apply`] crosses into natural space.

use crate::error::EditorError;
use crate::geometry::{Corner, ImageMetrics, clamp_position, finite_delta, fit_centered};
use kurbo::{Point, Rect, Size, Vec2};

/// Relative tolerance used when checking whether a rectangle already has the
/// target ratio.
const RATIO_EPSILON: f64 = 1e-6;

fn check_ratio(ratio: f64) -> Result<f64, EditorError> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(EditorError::InvalidAspectRatio(ratio))
    }
}

/// An in-progress crop. Dropping it is the same as cancelling.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    metrics: ImageMetrics,
    ratio: f64,
    min_size: f64,
    rect: Rect,
}

impl CropSession {
    /// Start cropping.
    ///
    /// A previously committed crop (natural space) is scaled back to display
    /// space and reused. If it no longer matches `ratio` (the output
    /// dimensions changed since) the largest rectangle of the right ratio
    /// inside it is used instead. Without a committed crop the box starts as
    /// the largest centred rectangle of `ratio` that fits the image.
    ///
    /// # Errors
    /// [`EditorError::InvalidAspectRatio`] for a non-finite or non-positive
    /// ratio.
    pub fn begin(
        metrics: ImageMetrics,
        ratio: f64,
        committed: Option<Rect>,
        min_size: f64,
    ) -> Result<Self, EditorError> {
        let ratio = check_ratio(ratio)?;
        let mut session = Self {
            metrics,
            ratio,
            min_size,
            rect: fit_centered(metrics.display_bounds(), ratio),
        };
        if let Some(natural) = committed
            && let Some(rect) = session.restore(natural)
        {
            session.rect = rect;
        }
        log::debug!("crop session started at {:?}", session.rect);
        Ok(session)
    }

    fn restore(&self, natural: Rect) -> Option<Rect> {
        let bounds = self.metrics.display_bounds();
        let display = self.metrics.to_display_rect(natural).intersect(bounds);
        if !(display.width() > 0.0 && display.height() > 0.0) {
            return None;
        }
        let current = display.width() / display.height();
        let rect = if ((current - self.ratio) / self.ratio).abs() <= RATIO_EPSILON {
            display
        } else {
            fit_centered(display, self.ratio)
        };
        let origin = clamp_position(rect.origin(), rect.size(), self.metrics.display);
        Some(Rect::from_origin_size(origin, rect.size()))
    }

    /// Current box in display space.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn metrics(&self) -> ImageMetrics {
        self.metrics
    }

    /// Translate the box, keeping it inside the image.
    pub fn drag_by(&mut self, delta: Vec2) {
        let delta = finite_delta(delta);
        let size = self.rect.size();
        let origin = clamp_position(self.rect.origin() + delta, size, self.metrics.display);
        self.rect = Rect::from_origin_size(origin, size);
    }

    /// Resize by dragging `corner` by `delta` (incremental, one move event).
    ///
    /// The dominant axis is x when `|dx| > |dy × ratio|`, otherwise y; the
    /// other side follows from the ratio. The opposite corner stays fixed.
    /// The minimum size is applied first, then the width is capped by the
    /// room between the anchor and the image edges on both axes, which keeps
    /// the ratio and containment at once.
    pub fn resize(&mut self, corner: Corner, delta: Vec2) {
        let delta = finite_delta(delta);
        let ratio = self.ratio;
        let anchor = corner.opposite().of(self.rect);

        let grow_x = if corner.is_left() { -delta.x } else { delta.x };
        let grow_y = if corner.is_top() { -delta.y } else { delta.y };
        let wanted = if delta.x.abs() > (delta.y * ratio).abs() {
            self.rect.width() + grow_x
        } else {
            (self.rect.height() + grow_y) * ratio
        };

        let min_width = self.min_size.max(self.min_size * ratio);
        let wanted = if wanted.is_finite() { wanted.max(min_width) } else { min_width };

        let display = self.metrics.display;
        let room_x = if corner.is_left() { anchor.x } else { display.width - anchor.x };
        let room_y = if corner.is_top() { anchor.y } else { display.height - anchor.y };
        let width = wanted.min(room_x).min(room_y * ratio).max(0.0);
        let height = width / ratio;

        let x0 = if corner.is_left() { anchor.x - width } else { anchor.x };
        let y0 = if corner.is_top() { anchor.y - height } else { anchor.y };
        self.rect = Rect::from_origin_size(Point::new(x0, y0), Size::new(width, height));
    }

    /// Switch to a new target ratio, refitting the box as the largest centred
    /// rectangle of that ratio.
    ///
    /// # Errors
    /// [`EditorError::InvalidAspectRatio`]; the session is unchanged.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), EditorError> {
        self.ratio = check_ratio(ratio)?;
        self.rect = fit_centered(self.metrics.display_bounds(), self.ratio);
        Ok(())
    }

    /// The box in natural image pixels, ready to be committed.
    pub fn apply(&self) -> Rect {
        self.metrics.to_natural_rect(self.rect)
    }
}
