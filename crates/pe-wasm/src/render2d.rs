//! Canvas2D painter.
//!
//! Executes a [`DisplayList`] on an HTML `<canvas>` through
//! `CanvasRenderingContext2d`. The background photo is decoded by the page
//! and handed in as an `HtmlImageElement`; image ops are skipped without it.

use pe_render::paint::{DisplayList, DrawOp, Frame};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

const HANDLE_BORDER: &str = "#FFFFFF";
const LABEL_FONT: &str = "12px Inter, system-ui, sans-serif";
const TEXT_PADDING: f64 = 4.0;

/// Paint a whole frame, clearing the canvas first.
pub fn paint(ctx: &CanvasRenderingContext2d, list: &DisplayList, background: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    ctx.clear_rect(0.0, 0.0, list.width, list.height);
    for op in &list.ops {
        paint_op(ctx, op, background)?;
    }
    Ok(())
}

fn paint_op(ctx: &CanvasRenderingContext2d, op: &DrawOp, background: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    match op {
        DrawOp::Image { source, dest, .. } => {
            let Some(img) = background else {
                log::trace!("no decoded background, skipping image op");
                return Ok(());
            };
            ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                img,
                source.x,
                source.y,
                source.width,
                source.height,
                dest.x,
                dest.y,
                dest.width,
                dest.height,
            )
        }
        DrawOp::FillRect { frame, color } => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
            Ok(())
        }
        DrawOp::Text {
            frame,
            content,
            font_size,
            font_family,
            color,
            rotation,
            ..
        } => draw_text(ctx, frame, content, *font_size, font_family, color, *rotation),
        DrawOp::Rectangle {
            frame,
            stroke,
            fill,
            line_width,
            rotation,
            ..
        } => draw_shape(ctx, frame, *rotation, |ctx, w, h| {
            ctx.begin_path();
            ctx.rect(-w / 2.0, -h / 2.0, w, h);
            fill_and_stroke(ctx, fill.as_deref(), stroke, *line_width);
            Ok(())
        }),
        DrawOp::Ellipse {
            frame,
            stroke,
            fill,
            line_width,
            rotation,
            ..
        } => draw_shape(ctx, frame, *rotation, |ctx, w, h| {
            ctx.begin_path();
            ctx.ellipse(0.0, 0.0, w / 2.0, h / 2.0, 0.0, 0.0, std::f64::consts::TAU)?;
            fill_and_stroke(ctx, fill.as_deref(), stroke, *line_width);
            Ok(())
        }),
        DrawOp::Outline {
            frame,
            color,
            line_width,
            dashed,
        } => draw_outline(ctx, frame, color, *line_width, *dashed),
        DrawOp::Handle { frame, color, .. } => {
            ctx.set_fill_style_str(color);
            ctx.set_stroke_style_str(HANDLE_BORDER);
            ctx.set_line_width(1.0);
            ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
            ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
            Ok(())
        }
        DrawOp::Shade { bounds, hole, color } => {
            draw_shade(ctx, bounds, hole, color);
            Ok(())
        }
        DrawOp::Label {
            frame,
            text,
            color,
            background,
        } => draw_label(ctx, frame, text, color, background),
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// Run `body` with the origin at the centre of `frame`, rotated by
/// `rotation` degrees. `body` receives the frame size.
fn draw_shape(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    rotation: Option<f64>,
    body: impl FnOnce(&CanvasRenderingContext2d, f64, f64) -> Result<(), JsValue>,
) -> Result<(), JsValue> {
    ctx.save();
    let result = translate_and_rotate(ctx, frame, rotation).and_then(|()| body(ctx, frame.width, frame.height));
    ctx.restore();
    result
}

fn translate_and_rotate(ctx: &CanvasRenderingContext2d, frame: &Frame, rotation: Option<f64>) -> Result<(), JsValue> {
    ctx.translate(frame.x + frame.width / 2.0, frame.y + frame.height / 2.0)?;
    if let Some(deg) = rotation {
        ctx.rotate(deg.to_radians())?;
    }
    Ok(())
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, fill: Option<&str>, stroke: &str, line_width: f64) {
    if let Some(fill) = fill {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(line_width);
    ctx.stroke();
}

fn draw_text(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    content: &str,
    font_size: f64,
    font_family: &str,
    color: &str,
    rotation: Option<f64>,
) -> Result<(), JsValue> {
    draw_shape(ctx, frame, rotation, |ctx, w, h| {
        ctx.set_font(&format!("{font_size}px {font_family}"));
        ctx.set_fill_style_str(color);
        ctx.set_text_baseline("top");
        ctx.set_text_align("left");

        let max_w = (w - TEXT_PADDING * 2.0).max(1.0);
        let line_height = font_size * 1.2;
        let (left, top) = (-w / 2.0 + TEXT_PADDING, -h / 2.0 + TEXT_PADDING);
        for (idx, line) in wrap_text_lines(ctx, content, max_w).iter().enumerate() {
            ctx.fill_text(line, left, top + idx as f64 * line_height)?;
        }
        Ok(())
    })
}

/// Greedy word wrap against the current font. Words wider than a line are
/// left to overflow.
fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(current);
    }
    out
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

// ─── Chrome ──────────────────────────────────────────────────────────────

fn draw_outline(ctx: &CanvasRenderingContext2d, frame: &Frame, color: &str, line_width: f64, dashed: bool) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(line_width);
    if dashed {
        ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0)))?;
    }
    ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
    ctx.restore();
    Ok(())
}

/// Four bands around `hole`, so the crop box itself stays undimmed.
fn draw_shade(ctx: &CanvasRenderingContext2d, bounds: &Frame, hole: &Frame, color: &str) {
    let right = bounds.x + bounds.width;
    let bottom = bounds.y + bounds.height;
    let hole_right = hole.x + hole.width;
    let hole_bottom = hole.y + hole.height;

    ctx.set_fill_style_str(color);
    ctx.fill_rect(bounds.x, bounds.y, bounds.width, hole.y - bounds.y);
    ctx.fill_rect(bounds.x, hole_bottom, bounds.width, bottom - hole_bottom);
    ctx.fill_rect(bounds.x, hole.y, hole.x - bounds.x, hole.height);
    ctx.fill_rect(hole_right, hole.y, right - hole_right, hole.height);
}

fn draw_label(ctx: &CanvasRenderingContext2d, frame: &Frame, text: &str, color: &str, background: &str) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_fill_style_str(background);
    ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
    ctx.set_font(LABEL_FONT);
    ctx.set_fill_style_str(color);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let result = ctx.fill_text(text, frame.x + frame.width / 2.0, frame.y + frame.height / 2.0);
    ctx.restore();
    result
}
