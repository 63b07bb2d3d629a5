//! Poster state → display list.
//!
//! The live view is described as a flat, serialisable list of draw
//! operations in paint order. The host page (or the Canvas2D painter in
//! `pe-wasm`) executes them; nothing here touches the DOM.

use pe_core::crop::CropSession;
use pe_core::document::{BackgroundState, PosterDocument};
use pe_core::geometry::Corner;
use pe_core::id::ElementId;
use pe_core::model::{Color, Element, ElementKind, ElementVariant};
use pe_core::{Rect, Size};
use serde::Serialize;

use crate::hit::handle_rect;

/// Dashed outline around the selected element.
pub const SELECTION_COLOR: &str = "#9B87F5";
/// Shade drawn over the photo outside the crop box.
pub const CROP_SHADE: &str = "rgba(0, 0, 0, 0.5)";
const BORDER_WIDTH: f64 = 2.0;

/// Axis-aligned box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for Frame {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    /// Draw `source` (natural pixels of the photo) into `dest`.
    #[serde(rename_all = "camelCase")]
    Image { url: String, source: Frame, dest: Frame },
    #[serde(rename_all = "camelCase")]
    FillRect { frame: Frame, color: String },
    #[serde(rename_all = "camelCase")]
    Text {
        id: ElementId,
        frame: Frame,
        content: String,
        font_size: f64,
        font_family: String,
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        rotation: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Rectangle {
        id: ElementId,
        frame: Frame,
        stroke: String,
        fill: Option<String>,
        line_width: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        rotation: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Ellipse {
        id: ElementId,
        frame: Frame,
        stroke: String,
        fill: Option<String>,
        line_width: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        rotation: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Outline {
        frame: Frame,
        color: String,
        line_width: f64,
        dashed: bool,
    },
    #[serde(rename_all = "camelCase")]
    Handle { corner: Corner, frame: Frame, color: String },
    /// Darken `bounds` everywhere except `hole`.
    #[serde(rename_all = "camelCase")]
    Shade { bounds: Frame, hole: Frame, color: String },
    #[serde(rename_all = "camelCase")]
    Label { frame: Frame, text: String, color: String, background: String },
}

/// A frame of the editor view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayList {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Everything the display list depends on for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub document: &'a PosterDocument,
    /// Layout size of the poster canvas.
    pub canvas: Size,
    pub selected: Option<ElementId>,
    /// Active crop session; replaces the element view while present.
    pub crop: Option<&'a CropSession>,
    /// Drop selection chrome (set while exporting).
    pub hide_transient: bool,
    pub handle_size: f64,
}

// ─── Per-variant renderers ───────────────────────────────────────────────

type Renderer = fn(&Element) -> DrawOp;

fn renderer(variant: ElementVariant) -> Renderer {
    match variant {
        ElementVariant::Text => render_text,
        ElementVariant::Rectangle => render_rectangle,
        ElementVariant::Circle => render_circle,
    }
}

fn render_text(el: &Element) -> DrawOp {
    let ElementKind::Text {
        content,
        font_size,
        font_family,
    } = &el.kind
    else {
        unreachable!("text renderer dispatched for {:?}", el.variant());
    };
    DrawOp::Text {
        id: el.id,
        frame: el.bounds().into(),
        content: content.clone(),
        font_size: *font_size,
        font_family: font_family.clone(),
        color: el.style.stroke.to_css(),
        rotation: el.rotation,
    }
}

fn render_rectangle(el: &Element) -> DrawOp {
    DrawOp::Rectangle {
        id: el.id,
        frame: el.bounds().into(),
        stroke: el.style.stroke.to_css(),
        fill: el.style.fill.as_ref().map(Color::to_css),
        line_width: BORDER_WIDTH,
        rotation: el.rotation,
    }
}

fn render_circle(el: &Element) -> DrawOp {
    DrawOp::Ellipse {
        id: el.id,
        frame: el.bounds().into(),
        stroke: el.style.stroke.to_css(),
        fill: el.style.fill.as_ref().map(Color::to_css),
        line_width: BORDER_WIDTH,
        rotation: el.rotation,
    }
}

// ─── Builders ────────────────────────────────────────────────────────────

pub fn build_display_list(view: &SceneView<'_>) -> DisplayList {
    match view.crop {
        Some(crop) => build_crop_view(view, crop),
        None => build_poster_view(view),
    }
}

fn build_poster_view(view: &SceneView<'_>) -> DisplayList {
    let doc = view.document;
    let canvas = Rect::from_origin_size((0.0, 0.0), view.canvas);
    let mut ops = Vec::with_capacity(doc.elements.len() + 7);

    if let (BackgroundState::Ready { url, .. }, Some(source)) =
        (&doc.background, doc.background_source(view.canvas))
    {
        ops.push(DrawOp::Image {
            url: url.clone(),
            source: source.into(),
            dest: canvas.into(),
        });
    }

    if doc.overlay_opacity > 0.0 {
        ops.push(DrawOp::FillRect {
            frame: canvas.into(),
            color: Color::rgba(0.0, 0.0, 0.0, doc.overlay_opacity as f32).to_css(),
        });
    }

    for el in doc.elements.iter() {
        log::trace!("paint {} z={} at ({}, {})", el.id, el.z_index, el.x, el.y);
        ops.push(renderer(el.variant())(el));
    }

    if !view.hide_transient
        && let Some(id) = view.selected
        && let Some(el) = doc.elements.get(id)
    {
        let bounds = el.bounds();
        ops.push(DrawOp::Outline {
            frame: bounds.into(),
            color: SELECTION_COLOR.to_string(),
            line_width: BORDER_WIDTH,
            dashed: true,
        });
        push_handles(&mut ops, bounds, view.handle_size, SELECTION_COLOR);
    }

    DisplayList {
        width: view.canvas.width,
        height: view.canvas.height,
        ops,
    }
}

fn build_crop_view(view: &SceneView<'_>, crop: &CropSession) -> DisplayList {
    let metrics = crop.metrics();
    let image = metrics.display_bounds();
    let rect = crop.rect();
    let mut ops = Vec::with_capacity(8);

    if let Some(url) = view.document.background.url() {
        ops.push(DrawOp::Image {
            url: url.to_string(),
            source: Rect::from_origin_size((0.0, 0.0), metrics.natural).into(),
            dest: image.into(),
        });
    }
    ops.push(DrawOp::Shade {
        bounds: image.into(),
        hole: rect.into(),
        color: CROP_SHADE.to_string(),
    });
    ops.push(DrawOp::Outline {
        frame: rect.into(),
        color: Color::WHITE.to_css(),
        line_width: BORDER_WIDTH,
        dashed: false,
    });
    push_handles(&mut ops, rect, view.handle_size, &Color::WHITE.to_css());

    let dims = &view.document.dimensions;
    ops.push(DrawOp::Label {
        frame: Rect::new(rect.x1 - 90.0, rect.y1 - 30.0, rect.x1 - 10.0, rect.y1 - 10.0).into(),
        text: format!("{} × {}", dims.width, dims.height),
        color: Color::WHITE.to_css(),
        background: "rgba(0, 0, 0, 0.7)".to_string(),
    });

    DisplayList {
        width: metrics.display.width,
        height: metrics.display.height,
        ops,
    }
}

fn push_handles(ops: &mut Vec<DrawOp>, bounds: Rect, size: f64, color: &str) {
    for corner in Corner::ALL {
        ops.push(DrawOp::Handle {
            corner,
            frame: handle_rect(bounds, corner, size).into(),
            color: color.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pe_core::config::EditorConfig;
    use pe_core::geometry::ImageMetrics;
    use pe_core::{Point, Size};
    use pretty_assertions::assert_eq;

    fn doc_with_background() -> PosterDocument {
        let mut doc = PosterDocument::new(&EditorConfig::default());
        doc.begin_background("bg.jpg");
        doc.finish_background("bg.jpg", Size::new(1600.0, 900.0), Size::new(800.0, 600.0))
            .unwrap();
        doc
    }

    fn view(doc: &PosterDocument) -> SceneView<'_> {
        SceneView {
            document: doc,
            canvas: Size::new(500.0, 500.0),
            selected: None,
            crop: None,
            hide_transient: false,
            handle_size: 10.0,
        }
    }

    #[test]
    fn background_overlay_then_elements_in_z_order() {
        let mut doc = doc_with_background();
        let low = ElementVariant::Rectangle.create(Point::new(0.0, 0.0), doc.elements.next_z_index());
        doc.elements.add(low);
        let high = ElementVariant::Text.create(Point::new(0.0, 0.0), doc.elements.next_z_index());
        doc.elements.add(high);

        let list = build_display_list(&view(&doc));
        let kinds: Vec<&str> = list
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Image { .. } => "image",
                DrawOp::FillRect { .. } => "overlay",
                DrawOp::Rectangle { .. } => "rect",
                DrawOp::Text { .. } => "text",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["image", "overlay", "rect", "text"]);
    }

    #[test]
    fn text_op_carries_the_element_payload() {
        let mut el = ElementVariant::Text.create(Point::new(10.0, 20.0), 1);
        el.rotation = Some(15.0);
        let DrawOp::Text {
            frame,
            content,
            font_size,
            font_family,
            rotation,
            ..
        } = renderer(el.variant())(&el)
        else {
            panic!("text element must paint as text");
        };
        assert_eq!((frame.x, frame.y, frame.width, frame.height), (10.0, 20.0, 200.0, 50.0));
        assert_eq!(content, "Add your text here");
        assert_eq!(font_size, 24.0);
        assert_eq!(font_family, "Roboto");
        assert_eq!(rotation, Some(15.0));
    }

    #[test]
    fn selection_chrome_hidden_while_exporting() {
        let mut doc = doc_with_background();
        let el = ElementVariant::Circle.create(Point::new(5.0, 5.0), 1);
        let id = el.id;
        doc.elements.add(el);

        let mut v = view(&doc);
        v.selected = Some(id);
        let shown = build_display_list(&v);
        assert_eq!(shown.ops.iter().filter(|op| matches!(op, DrawOp::Handle { .. })).count(), 4);

        v.hide_transient = true;
        let hidden = build_display_list(&v);
        assert!(!hidden.ops.iter().any(|op| matches!(op, DrawOp::Outline { .. } | DrawOp::Handle { .. })));
    }

    #[test]
    fn crop_view_replaces_elements() {
        let mut doc = doc_with_background();
        doc.elements.add(ElementVariant::Text.create(Point::ZERO, 1));
        let metrics = ImageMetrics::new(Size::new(1600.0, 900.0), Size::new(800.0, 450.0)).unwrap();
        let crop = CropSession::begin(metrics, 1.0, None, 50.0).unwrap();
        let mut v = view(&doc);
        v.crop = Some(&crop);

        let list = build_display_list(&v);
        assert_eq!((list.width, list.height), (800.0, 450.0));
        assert!(!list.ops.iter().any(|op| matches!(op, DrawOp::Text { .. })));
        assert!(list.ops.iter().any(|op| matches!(op, DrawOp::Shade { hole, .. } if hole.x == 175.0)));
        assert!(list.ops.iter().any(|op| matches!(op, DrawOp::Label { text, .. } if text == "1080 × 1080")));
    }

    #[test]
    fn zero_overlay_is_skipped() {
        let mut doc = doc_with_background();
        doc.set_overlay_opacity(0.0).unwrap();
        let list = build_display_list(&view(&doc));
        assert!(!list.ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
    }

    #[test]
    fn json_is_tagged() {
        let doc = doc_with_background();
        let json: serde_json::Value = serde_json::from_str(&build_display_list(&view(&doc)).to_json()).unwrap();
        assert_eq!(json["ops"][0]["op"], "image");
        assert_eq!(json["ops"][1]["color"], "rgba(0, 0, 0, 0.3)");
    }
}
