//! Coordinate spaces and stateless conversions between them.
//!
//! Three spaces are in play:
//!
//! - **screen**: client pixels as delivered by pointer events.
//! - **canvas**: pixels local to the poster container (top-left origin,
//!   CSS scaling undone). Element positions live here. While cropping, the
//!   crop view's container is the displayed image, so canvas space equals
//!   *display* space of the background.
//! - **natural**: pixels of the original, unscaled photo.

use crate::error::EditorError;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// One of the four resize handles of an element or the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// The corner diagonally across; it stays fixed while this one is dragged.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Position of this corner on `rect`.
    pub fn of(self, rect: Rect) -> Point {
        let x = if self.is_left() { rect.x0 } else { rect.x1 };
        let y = if self.is_top() { rect.y0 } else { rect.y1 };
        Point::new(x, y)
    }

    pub fn name(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }
}

// ─── Screen ↔ canvas ─────────────────────────────────────────────────────

/// Placement of the canvas container on screen.
///
/// `origin` is the container's bounding-box top-left in client pixels and
/// `scale` is rendered size / layout size per axis (1.0 when the container
/// is not CSS-transformed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub origin: Point,
    pub scale: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl ViewTransform {
    /// Build a transform, treating unusable scale factors as 1.0.
    pub fn new(origin: Point, scale: Vec2) -> Self {
        let usable = |s: f64| if s.is_finite() && s > 0.0 { s } else { 1.0 };
        let origin = if origin.x.is_finite() && origin.y.is_finite() {
            origin
        } else {
            Point::ZERO
        };
        Self {
            origin,
            scale: Vec2::new(usable(scale.x), usable(scale.y)),
        }
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.origin.x) / self.scale.x,
            (screen.y - self.origin.y) / self.scale.y,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.scale.x + self.origin.x,
            canvas.y * self.scale.y + self.origin.y,
        )
    }
}

// ─── Display ↔ natural ───────────────────────────────────────────────────

/// Natural and displayed size of the background photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetrics {
    pub natural: Size,
    pub display: Size,
}

fn usable_size(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

impl ImageMetrics {
    /// # Errors
    /// Returns [`EditorError::DegenerateImage`] if either size has a zero,
    /// negative or non-finite side.
    pub fn new(natural: Size, display: Size) -> Result<Self, EditorError> {
        for size in [natural, display] {
            if !usable_size(size) {
                return Err(EditorError::DegenerateImage {
                    width: size.width,
                    height: size.height,
                });
            }
        }
        Ok(Self { natural, display })
    }

    /// Display size of a photo shown inside `container` without distortion.
    ///
    /// Landscape photos take the container width (never upscaled past the
    /// natural width); portrait and square photos take the container height.
    ///
    /// # Errors
    /// Same as [`ImageMetrics::new`].
    pub fn fit_within(natural: Size, container: Size) -> Result<Self, EditorError> {
        if !usable_size(natural) {
            return Err(EditorError::DegenerateImage {
                width: natural.width,
                height: natural.height,
            });
        }
        let ratio = natural.width / natural.height;
        let display = if ratio > 1.0 {
            let w = container.width.min(natural.width);
            Size::new(w, w / ratio)
        } else {
            let h = container.height.min(natural.height);
            Size::new(h * ratio, h)
        };
        Self::new(natural, display)
    }

    /// Multipliers taking display coordinates to natural coordinates.
    pub fn natural_per_display(&self) -> Vec2 {
        Vec2::new(
            self.natural.width / self.display.width,
            self.natural.height / self.display.height,
        )
    }

    pub fn to_natural_point(&self, p: Point) -> Point {
        let s = self.natural_per_display();
        Point::new(p.x * s.x, p.y * s.y)
    }

    pub fn to_display_point(&self, p: Point) -> Point {
        let s = self.natural_per_display();
        Point::new(p.x / s.x, p.y / s.y)
    }

    pub fn to_natural_rect(&self, r: Rect) -> Rect {
        Rect::from_points(self.to_natural_point(r.origin()), self.to_natural_point(Point::new(r.x1, r.y1)))
    }

    pub fn to_display_rect(&self, r: Rect) -> Rect {
        Rect::from_points(self.to_display_point(r.origin()), self.to_display_point(Point::new(r.x1, r.y1)))
    }

    /// The displayed image as a rectangle anchored at the origin.
    pub fn display_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.display)
    }
}

// ─── Clamping helpers ────────────────────────────────────────────────────

/// `max(lo, min(hi, value))`. When the range is empty (`hi < lo`) the lower
/// bound wins, so an oversized element pins to the top-left edge.
pub fn clamp_to_range(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}

/// Clamp a top-left position so a box of `size` stays inside `container`.
pub fn clamp_position(pos: Point, size: Size, container: Size) -> Point {
    Point::new(
        clamp_to_range(pos.x, 0.0, container.width - size.width),
        clamp_to_range(pos.y, 0.0, container.height - size.height),
    )
}

/// A length that is finite and at least `floor`.
pub fn sanitize_len(value: f64, floor: f64) -> f64 {
    if value.is_finite() { value.max(floor) } else { floor }
}

/// Zero out non-finite pointer deltas.
pub fn finite_delta(delta: Vec2) -> Vec2 {
    let f = |v: f64| if v.is_finite() { v } else { 0.0 };
    Vec2::new(f(delta.x), f(delta.y))
}

/// Largest rectangle with `width / height == ratio` that fits in `bounds`,
/// centred in it.
pub fn fit_centered(bounds: Rect, ratio: f64) -> Rect {
    let (bw, bh) = (bounds.width(), bounds.height());
    let (w, h) = if bw / bh > ratio {
        (bh * ratio, bh)
    } else {
        (bw, bw / ratio)
    };
    let x = bounds.x0 + (bw - w) / 2.0;
    let y = bounds.y0 + (bh - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}
