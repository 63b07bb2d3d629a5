//! WASM bridge for the poster editor. Exposes the editor controller to the
//! web page.
//!
//! Compiled via `wasm-pack build --target web`. Structured values cross the
//! boundary as JSON strings; the page owns the DOM, image decoding, the photo
//! search, and the PNG capture.

mod render2d;

use pe_core::dimensions::{self, Platform, PostFormat};
use pe_core::geometry::ViewTransform;
use pe_core::id::ElementId;
use pe_core::layers::LayerDirection;
use pe_core::model::{Color, ElementKind, ElementPatch, FONT_FAMILIES};
use pe_core::photo::{Photo, SearchResponse};
use pe_core::{EditorConfig, Point, Size, Vec2};
use pe_editor::{EditorController, Modifiers, ShortcutAction, ToolKind};
use pe_render::export::ExportError;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// The page-facing editor handle.
///
/// All interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct PosterCanvas {
    editor: EditorController,
}

#[wasm_bindgen]
impl PosterCanvas {
    /// Create an editor for a poster canvas laid out at `width` × `height`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        Self::build(EditorConfig::default(), width, height)
    }

    /// Like the constructor, with a JSON config (camelCase keys, all
    /// optional).
    pub fn with_config(config_json: &str, width: f64, height: f64) -> Result<PosterCanvas, JsValue> {
        let config = EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::build(config, width, height))
    }

    fn build(config: EditorConfig, width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        init_logging();

        let mut editor = EditorController::new(config);
        editor.set_canvas_size(Size::new(width, height));
        Self { editor }
    }

    // ─── Layout & rendering ──────────────────────────────────────────────

    /// Returns `false` for an unusable size or while exporting.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.editor.set_canvas_size(Size::new(width, height))
    }

    /// Size of the area the crop view fits the photo into.
    pub fn set_crop_viewport(&mut self, width: f64, height: f64) -> bool {
        self.editor.set_crop_viewport(Size::new(width, height))
    }

    /// Where the active surface sits on screen (its client rect origin and
    /// the CSS-to-canvas scale). Pointer coordinates are client coordinates.
    pub fn set_view(&mut self, origin_x: f64, origin_y: f64, scale_x: f64, scale_y: f64) {
        self.editor
            .set_view_transform(ViewTransform::new(Point::new(origin_x, origin_y), Vec2::new(scale_x, scale_y)));
    }

    /// Paint the current view. `background` is the decoded background photo,
    /// if the page has it. Returns `false` if the context rejected a call.
    pub fn render(&self, ctx: &CanvasRenderingContext2d, background: Option<HtmlImageElement>) -> bool {
        match render2d::paint(ctx, &self.editor.display_list(), background.as_ref()) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("paint failed: {err:?}");
                false
            }
        }
    }

    /// The current view as a JSON display list, for hosts that paint
    /// themselves.
    pub fn get_display_list(&self) -> String {
        self.editor.display_list().to_json()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `true` if the view needs repainting.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.editor.pointer_down(Point::new(x, y), modifiers)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.editor.pointer_move(Point::new(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.editor.pointer_up(Point::new(x, y))
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.editor.pointer_leave()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"handled":bool,"action":"<action_name>","tool":"<tool_name>"}`.
    /// The page should `preventDefault()` when `handled` is true, and must
    /// not forward keys typed into form fields.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        let action = self.editor.handle_key(key, modifiers);
        serde_json::json!({
            "handled": action.is_some(),
            "action": action.map_or("none", action_to_name),
            "tool": self.editor.tool().name(),
        })
        .to_string()
    }

    // ─── Tools & selection ───────────────────────────────────────────────

    /// Switch tools by name. Returns `false` for an unknown name or a
    /// refused switch (crop without a loaded photo).
    pub fn set_tool(&mut self, name: &str) -> bool {
        let Some(tool) = ToolKind::from_name(name) else {
            return false;
        };
        self.editor.set_tool(tool).is_ok()
    }

    pub fn get_tool_name(&self) -> String {
        self.editor.tool().name().to_string()
    }

    /// Currently selected element id, or an empty string.
    pub fn get_selected_id(&self) -> String {
        self.editor.selection().map(|id| id.as_str().to_string()).unwrap_or_default()
    }

    /// Select by id; an empty string clears the selection.
    pub fn select_by_id(&mut self, element_id: &str) -> bool {
        let id = (!element_id.is_empty()).then(|| ElementId::intern(element_id));
        self.editor.select(id).is_ok()
    }

    // ─── Element edits ───────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    /// Move the selected element in the stack: `up`, `down`, `top` or
    /// `bottom`.
    pub fn reorder_selected(&mut self, direction: &str) -> bool {
        match LayerDirection::from_name(direction) {
            Some(direction) => self.editor.reorder_selected(direction),
            None => false,
        }
    }

    /// All elements in paint order as JSON.
    pub fn get_elements_json(&self) -> String {
        serde_json::to_string(self.editor.elements()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Property-panel view of the selected element as a JSON object, or `{}`.
    pub fn get_selected_element_props(&self) -> String {
        let Some(el) = self.editor.selected_element() else {
            return "{}".to_string();
        };

        let mut props = serde_json::Map::new();
        props.insert("id".into(), serde_json::Value::String(el.id.as_str().to_string()));
        props.insert("type".into(), serde_json::json!(el.variant().name()));
        props.insert("x".into(), serde_json::json!(el.x));
        props.insert("y".into(), serde_json::json!(el.y));
        props.insert("width".into(), serde_json::json!(el.width));
        props.insert("height".into(), serde_json::json!(el.height));
        props.insert("zIndex".into(), serde_json::json!(el.z_index));
        props.insert("stroke".into(), serde_json::Value::String(el.style.stroke.to_hex()));
        props.insert(
            "fill".into(),
            el.style
                .fill
                .map_or(serde_json::Value::Null, |c| serde_json::Value::String(c.to_css())),
        );
        if let Some(deg) = el.rotation {
            props.insert("rotation".into(), serde_json::json!(deg));
        }
        if let ElementKind::Text {
            content,
            font_size,
            font_family,
        } = &el.kind
        {
            props.insert("content".into(), serde_json::Value::String(content.clone()));
            props.insert("fontSize".into(), serde_json::json!(font_size));
            props.insert("fontFamily".into(), serde_json::Value::String(font_family.clone()));
        }
        serde_json::Value::Object(props).to_string()
    }

    /// Set one property on the selected element. Returns `true` if the
    /// property was set.
    pub fn set_element_prop(&mut self, key: &str, value: &str) -> bool {
        let Some(id) = self.editor.selection() else {
            return false;
        };
        let Some(patch) = parse_prop(key, value) else {
            log::debug!("rejected property {key}={value}");
            return false;
        };
        match self.editor.update_element(id, patch) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("property {key} not applied: {err}");
                false
            }
        }
    }

    pub fn set_overlay_opacity(&mut self, opacity: f64) -> bool {
        self.editor.set_overlay_opacity(opacity).is_ok()
    }

    pub fn get_overlay_opacity(&self) -> f64 {
        self.editor.document().overlay_opacity
    }

    // ─── Output dimensions ───────────────────────────────────────────────

    pub fn get_dimensions_json(&self) -> String {
        serde_json::to_string(&self.editor.document().dimensions).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn select_platform(&mut self, name: &str) -> bool {
        match Platform::from_name(name) {
            Some(platform) => self.editor.select_platform(platform).is_ok(),
            None => false,
        }
    }

    pub fn select_format(&mut self, name: &str) -> bool {
        match PostFormat::from_name(name) {
            Some(format) => self.editor.select_format(format).is_ok(),
            None => false,
        }
    }

    /// Pick a preset of the current platform and format by its label.
    pub fn select_preset(&mut self, label: &str) -> bool {
        self.editor.select_preset(label).is_ok()
    }

    // ─── Background ──────────────────────────────────────────────────────

    /// Use a photo from the search grid (one `photos[]` entry as JSON).
    /// Returns the URL the page should load, or an empty string.
    pub fn select_photo(&mut self, photo_json: &str) -> String {
        match serde_json::from_str::<Photo>(photo_json) {
            Ok(photo) => match self.editor.select_photo(&photo) {
                Ok(()) => photo.background_url().to_string(),
                Err(err) => {
                    log::warn!("photo not applied: {err}");
                    String::new()
                }
            },
            Err(err) => {
                log::warn!("bad photo record: {err}");
                String::new()
            }
        }
    }

    /// Returns `false` while exporting.
    pub fn set_background(&mut self, url: &str) -> bool {
        self.editor.set_background(url).is_ok()
    }

    /// The page decoded `url` at its natural size. Returns `false` for a
    /// stale or degenerate image.
    pub fn background_loaded(&mut self, url: &str, natural_width: f64, natural_height: f64) -> bool {
        self.editor
            .background_loaded(url, Size::new(natural_width, natural_height))
            .unwrap_or(false)
    }

    pub fn background_failed(&mut self, url: &str, reason: &str) -> bool {
        self.editor.background_failed(url, reason).is_ok()
    }

    // ─── Crop ────────────────────────────────────────────────────────────

    pub fn begin_crop(&mut self) -> bool {
        self.editor.begin_crop().is_ok()
    }

    pub fn apply_crop(&mut self) -> bool {
        self.editor.apply_crop().is_ok()
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.editor.cancel_crop()
    }

    /// The crop box in display pixels plus the photo's display size, as
    /// JSON, or `null` outside crop mode.
    pub fn get_crop_json(&self) -> String {
        let Some(crop) = self.editor.crop() else {
            return "null".to_string();
        };
        let rect = crop.rect();
        let display = crop.metrics().display;
        serde_json::json!({
            "x": rect.x0,
            "y": rect.y0,
            "width": rect.width(),
            "height": rect.height(),
            "ratio": crop.ratio(),
            "displayWidth": display.width,
            "displayHeight": display.height,
        })
        .to_string()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Freeze editing for a capture. Returns `{"ok":true,"request":{...}}`
    /// with the capture parameters, or `{"ok":false,"error":"..."}`. Repaint
    /// before capturing so the selection chrome is gone.
    pub fn begin_export(&mut self) -> String {
        match self.editor.begin_export() {
            Ok(request) => serde_json::json!({ "ok": true, "request": request }).to_string(),
            Err(err) => serde_json::json!({ "ok": false, "error": err.to_string() }).to_string(),
        }
    }

    /// Report the captured PNG. Returns `false` if it was rejected (empty
    /// output, or no export in progress).
    pub fn finish_export(&mut self, png: &[u8]) -> bool {
        self.editor.finish_export(Ok(png.to_vec())).is_ok()
    }

    /// Report a failed capture and resume editing.
    pub fn fail_export(&mut self, reason: &str) {
        // The error is surfaced through the notification queue.
        let _ = self.editor.finish_export(Err(ExportError::Adapter(reason.to_string())));
    }

    pub fn is_exporting(&self) -> bool {
        self.editor.is_exporting()
    }

    // ─── Notifications ───────────────────────────────────────────────────

    /// Pending toasts as a JSON array of `{"level","message"}`; the queue is
    /// emptied.
    pub fn take_notifications(&mut self) -> String {
        serde_json::to_string(&self.editor.drain_notifications()).unwrap_or_else(|_| "[]".to_string())
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

fn parse_prop(key: &str, value: &str) -> Option<ElementPatch> {
    let number = || value.trim().parse::<f64>().ok();
    let mut patch = ElementPatch::default();
    match key {
        "content" => patch.content = Some(value.to_string()),
        "fontSize" => patch.font_size = Some(number()?),
        "fontFamily" => patch.font_family = Some(value.to_string()),
        "stroke" | "color" => patch.stroke = Some(Color::from_css(value)?),
        "fill" => {
            patch.fill = match value.trim() {
                "" | "none" | "transparent" => Some(None),
                css => Some(Some(Color::from_css(css)?)),
            }
        }
        "width" => patch.width = Some(number()?),
        "height" => patch.height = Some(number()?),
        "rotation" => patch.rotation = Some(number()?),
        _ => return None,
    }
    Some(patch)
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Tool(_) => "tool",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Layer(LayerDirection::Up) => "bringForward",
        ShortcutAction::Layer(LayerDirection::Down) => "sendBackward",
        ShortcutAction::Layer(LayerDirection::Top) => "bringToFront",
        ShortcutAction::Layer(LayerDirection::Bottom) => "sendToBack",
    }
}

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        // Already installed when a second canvas is created.
        let _ = console_log::init_with_level(log::Level::Debug);
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("poster editor panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Presets for a platform/format pair as a JSON array, or `[]` for unknown
/// names.
#[wasm_bindgen]
pub fn presets_json(platform: &str, format: &str) -> String {
    match (Platform::from_name(platform), PostFormat::from_name(format)) {
        (Some(platform), Some(format)) => {
            serde_json::to_string(dimensions::presets(platform, format)).unwrap_or_else(|_| "[]".to_string())
        }
        _ => "[]".to_string(),
    }
}

/// Font families offered for text elements, as a JSON array.
#[wasm_bindgen]
pub fn font_families_json() -> String {
    serde_json::to_string(&FONT_FAMILIES).unwrap_or_else(|_| "[]".to_string())
}

/// Validate a search response page. Returns
/// `{"ok":true,"photos":[...],"hasMore":bool}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn parse_search_response(json: &str) -> String {
    match serde_json::from_str::<SearchResponse>(json) {
        Ok(page) => serde_json::json!({
            "ok": true,
            "photos": page.photos,
            "hasMore": page.has_more(),
        })
        .to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
