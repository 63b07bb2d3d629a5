//! Element model for the poster canvas.
//!
//! The poster is a flat list of elements painted in ascending z-index order.
//! Three closed variants exist (text, rectangle, circle); each variant's
//! creation defaults live in one table (`ElementVariant::defaults`) instead of
//! being spread over the event handlers.

use crate::error::EditorError;
use crate::geometry::{Corner, finite_delta, sanitize_len};
use crate::id::ElementId;
use crate::layers::{self, LayerDirection};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Deserializer, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Channels stored as f32 in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let channels: [u8; 4] = match hex.len() {
            3 => [short(0)?, short(1)?, short(2)?, 255],
            4 => [short(0)?, short(1)?, short(2)?, short(3)?],
            6 => [long(0)?, long(2)?, long(4)?, 255],
            8 => [long(0)?, long(2)?, long(4)?, long(6)?],
            _ => return None,
        };
        let [r, g, b, a] = channels.map(|c| c as f32 / 255.0);
        Some(Self::rgba(r, g, b, a))
    }

    /// Parse a CSS color as produced by the property panel: hex, or
    /// `rgb(r, g, b)` / `rgba(r, g, b, a)` with 0–255 channels.
    pub fn from_css(css: &str) -> Option<Self> {
        let css = css.trim();
        let body = css
            .strip_prefix("rgba(")
            .or_else(|| css.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        let Some(body) = body else {
            return Self::from_hex(css);
        };

        let parts: Vec<f32> = body
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        let channel = |v: f32| (v / 255.0).clamp(0.0, 1.0);
        match parts.as_slice() {
            [r, g, b] => Some(Self::rgba(channel(*r), channel(*g), channel(*b), 1.0)),
            [r, g, b, a] => Some(Self::rgba(channel(*r), channel(*g), channel(*b), a.clamp(0.0, 1.0))),
            _ => None,
        }
    }

    /// `#RRGGBB` for opaque colors, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(|c| (c * 255.0).round() as u8);
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS form understood by every browser: hex when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            return self.to_hex();
        }
        let [r, g, b] = [self.r, self.g, self.b].map(|c| (c * 255.0).round() as u8);
        format!("rgba({r}, {g}, {b}, {})", self.a)
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// Paint attributes shared by every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Text color for text elements, border color for shapes.
    pub stroke: Color,
    /// Background fill; `None` is transparent.
    pub fill: Option<Color>,
}

/// Variant payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        font_size: f64,
        font_family: String,
    },
    Rectangle,
    Circle,
}

/// Variant tag without payload, as produced by a creation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementVariant {
    Text,
    Rectangle,
    Circle,
}

/// Creation defaults for one variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantDefaults {
    pub size: Size,
    pub stroke: Color,
    pub fill: Option<Color>,
}

/// Initial content of a new text element.
pub const DEFAULT_TEXT: &str = "Add your text here";
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// Font families offered by the property panel.
pub const FONT_FAMILIES: [&str; 6] = [
    "Roboto",
    "Arial",
    "Verdana",
    "Georgia",
    "Times New Roman",
    "Courier New",
];

const TRANSLUCENT_WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 0.5);

const TEXT_DEFAULTS: VariantDefaults = VariantDefaults {
    size: Size::new(200.0, 50.0),
    stroke: Color::WHITE,
    fill: None,
};

const SHAPE_DEFAULTS: VariantDefaults = VariantDefaults {
    size: Size::new(100.0, 100.0),
    stroke: Color::WHITE,
    fill: Some(TRANSLUCENT_WHITE),
};

impl ElementVariant {
    pub fn defaults(self) -> &'static VariantDefaults {
        match self {
            ElementVariant::Text => &TEXT_DEFAULTS,
            ElementVariant::Rectangle | ElementVariant::Circle => &SHAPE_DEFAULTS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementVariant::Text => "text",
            ElementVariant::Rectangle => "rectangle",
            ElementVariant::Circle => "circle",
        }
    }

    /// Build a fresh element of this variant with its top-left at `at`.
    pub fn create(self, at: Point, z_index: u32) -> Element {
        let d = self.defaults();
        let kind = match self {
            ElementVariant::Text => ElementKind::Text {
                content: DEFAULT_TEXT.to_string(),
                font_size: DEFAULT_FONT_SIZE,
                font_family: DEFAULT_FONT_FAMILY.to_string(),
            },
            ElementVariant::Rectangle => ElementKind::Rectangle,
            ElementVariant::Circle => ElementKind::Circle,
        };
        Element {
            id: ElementId::with_prefix(self.name()),
            kind,
            x: at.x,
            y: at.y,
            width: d.size.width,
            height: d.size.height,
            z_index,
            style: Style {
                stroke: d.stroke,
                fill: d.fill,
            },
            rotation: None,
        }
    }
}

/// A placed visual object on the poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: u32,
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl Element {
    pub fn variant(&self) -> ElementVariant {
        match self.kind {
            ElementKind::Text { .. } => ElementVariant::Text,
            ElementKind::Rectangle => ElementVariant::Rectangle,
            ElementKind::Circle => ElementVariant::Circle,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Whether `p` falls inside the element as painted. A rotated element
    /// turns about its centre, so `p` is turned back by the same angle before
    /// the bounds test.
    pub fn contains(&self, p: Point) -> bool {
        let p = match self.rotation {
            Some(deg) if deg.is_finite() && deg != 0.0 => {
                let centre = self.bounds().center();
                let (sin, cos) = (-deg.to_radians()).sin_cos();
                let d = p - centre;
                centre + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
            }
            _ => p,
        };
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Resize by dragging `corner` by `delta`.
    ///
    /// Left/top handles move the near edge and keep the far edge fixed;
    /// right/bottom handles only change the size. Sizes never drop below
    /// `min`, and the position shift is derived from the clamped size so the
    /// far edge does not jump.
    pub fn resize_from_corner(&mut self, corner: Corner, delta: Vec2, min: f64) {
        let delta = finite_delta(delta);

        if corner.is_left() {
            let width = sanitize_len(self.width - delta.x, min);
            self.x += self.width - width;
            self.width = width;
        } else {
            self.width = sanitize_len(self.width + delta.x, min);
        }

        if corner.is_top() {
            let height = sanitize_len(self.height - delta.y, min);
            self.y += self.height - height;
            self.height = height;
        } else {
            self.height = sanitize_len(self.height + delta.y, min);
        }
    }
}

// ─── Property edits ──────────────────────────────────────────────────────

/// A partial update from the property panel. `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub stroke: Option<Color>,
    /// `Some(None)` clears the fill; in JSON an explicit `null` clears it
    /// and an absent key leaves it alone.
    #[serde(deserialize_with = "present_field", skip_serializing_if = "Option::is_none")]
    pub fill: Option<Option<Color>>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
}

/// Any value that reaches the deserializer was present in the input, `null`
/// included. Absent keys fall back to `#[serde(default)]`.
fn present_field<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

impl ElementPatch {
    /// Apply the patch. Sizes are clamped to `min_size`; text-only fields on a
    /// shape are rejected.
    ///
    /// # Errors
    /// [`EditorError::InvalidProperty`] for a non-finite or non-positive font
    /// size, non-finite rotation, or text fields on a shape. The element is
    /// left untouched on error.
    pub fn apply(&self, element: &mut Element, min_size: f64) -> Result<(), EditorError> {
        let invalid = |key: &str, value: String| EditorError::InvalidProperty {
            key: key.to_string(),
            value,
        };

        if let Some(size) = self.font_size
            && !(size.is_finite() && size > 0.0)
        {
            return Err(invalid("fontSize", size.to_string()));
        }
        if let Some(deg) = self.rotation
            && !deg.is_finite()
        {
            return Err(invalid("rotation", deg.to_string()));
        }
        let touches_text = self.content.is_some() || self.font_size.is_some() || self.font_family.is_some();
        if touches_text && !matches!(element.kind, ElementKind::Text { .. }) {
            return Err(invalid("content", element.variant().name().to_string()));
        }

        if let ElementKind::Text {
            content,
            font_size,
            font_family,
        } = &mut element.kind
        {
            if let Some(c) = &self.content {
                content.clone_from(c);
            }
            if let Some(s) = self.font_size {
                *font_size = s;
            }
            if let Some(f) = &self.font_family {
                font_family.clone_from(f);
            }
        }
        if let Some(stroke) = self.stroke {
            element.style.stroke = stroke;
        }
        if let Some(fill) = self.fill {
            element.style.fill = fill;
        }
        if let Some(w) = self.width {
            element.width = sanitize_len(w, min_size);
        }
        if let Some(h) = self.height {
            element.height = sanitize_len(h, min_size);
        }
        if let Some(deg) = self.rotation {
            element.rotation = Some(deg);
        }
        Ok(())
    }
}

// ─── Collection ──────────────────────────────────────────────────────────

/// The placed elements, always sorted ascending by z-index so that array
/// order is paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementModel {
    elements: Vec<Element>,
}

impl ElementModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in paint order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// z-index a newly created element receives (it lands on top).
    pub fn next_z_index(&self) -> u32 {
        self.elements.len() as u32 + 1
    }

    /// Insert an element and restore the paint-order invariant.
    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
        layers::normalize(&mut self.elements);
    }

    /// Remove an element. Remaining z-indices are compacted to `1..=n` so the
    /// next created element does not collide with an existing one.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        let removed = self.elements.remove(idx);
        layers::normalize(&mut self.elements);
        Some(removed)
    }

    /// Move an element in the stack. Returns `false` when nothing changed.
    pub fn reorder(&mut self, id: ElementId, direction: LayerDirection) -> bool {
        layers::reorder(&mut self.elements, id, direction)
    }
}
