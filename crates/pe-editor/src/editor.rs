//! The editor controller.
//!
//! Owns every piece of mutable editor state (document, active tool,
//! selection, gesture, crop session, export flag) and is passed by reference
//! to whatever renders it. All entry points are synchronous; the host feeds
//! events in dispatch order.

use crate::engine::{EditMutation, MutationEngine};
use crate::input::{InputEvent, Modifiers};
use crate::interaction::{Effect, InteractionMachine, Session, Target};
use crate::notify::Notification;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::ToolKind;
use pe_core::config::EditorConfig;
use pe_core::crop::CropSession;
use pe_core::dimensions::{CanvasDimensions, Platform, PostFormat};
use pe_core::document::PosterDocument;
use pe_core::error::EditorError;
use pe_core::geometry::{ImageMetrics, ViewTransform};
use pe_core::id::ElementId;
use pe_core::layers::LayerDirection;
use pe_core::model::{Element, ElementPatch, ElementVariant};
use pe_core::photo::Photo;
use pe_core::{Point, Rect, Size};
use pe_render::export::{self, ExportError, ExportRequest, ExportedImage, RenderAdapter};
use pe_render::hit::{CanvasHit, hit_test, hit_test_crop};
use pe_render::paint::{DisplayList, SceneView, build_display_list};

pub struct EditorController {
    config: EditorConfig,
    engine: MutationEngine,
    tool: ToolKind,
    selection: Option<ElementId>,
    machine: InteractionMachine,
    crop: Option<CropSession>,
    /// Size of the area the crop view fits the photo into; the canvas size
    /// when unset.
    crop_viewport: Option<Size>,
    view: ViewTransform,
    exporting: bool,
    notifications: Vec<Notification>,
}

impl EditorController {
    pub fn new(config: EditorConfig) -> Self {
        let dims = CanvasDimensions::default();
        let canvas = Size::new(dims.width as f64, dims.height as f64);
        Self {
            engine: MutationEngine::new(&config, canvas),
            config,
            tool: ToolKind::Select,
            selection: None,
            machine: InteractionMachine::new(),
            crop: None,
            crop_viewport: None,
            view: ViewTransform::default(),
            exporting: false,
            notifications: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &PosterDocument {
        &self.engine.document
    }

    pub fn elements(&self) -> &[Element] {
        self.engine.document.elements.as_slice()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.engine.document.elements.get(id))
    }

    pub fn session(&self) -> Session {
        self.machine.session()
    }

    pub fn crop(&self) -> Option<&CropSession> {
        self.crop.as_ref()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn canvas_size(&self) -> Size {
        self.engine.canvas
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Layout size of the poster canvas (drag bounds). Returns `false` when
    /// the size is unusable or an export is in flight.
    pub fn set_canvas_size(&mut self, size: Size) -> bool {
        if self.exporting {
            log::debug!("export in progress, keeping canvas size");
            return false;
        }
        if size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0 {
            self.engine.canvas = size;
            true
        } else {
            log::warn!("ignoring canvas size {size:?}");
            false
        }
    }

    /// Returns `false` while an export is in flight.
    pub fn set_crop_viewport(&mut self, size: Size) -> bool {
        if self.exporting {
            log::debug!("export in progress, keeping crop viewport");
            return false;
        }
        self.crop_viewport = Some(size);
        true
    }

    /// Placement of the active surface (poster canvas or crop view) on
    /// screen. Pointer methods taking client coordinates go through it.
    pub fn set_view_transform(&mut self, view: ViewTransform) {
        self.view = view;
    }

    fn crop_container(&self) -> Size {
        self.crop_viewport.unwrap_or(self.engine.canvas)
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&mut self, client: Point, modifiers: Modifiers) -> bool {
        let p = self.view.screen_to_canvas(client);
        self.handle_event(&InputEvent::PointerDown {
            x: p.x,
            y: p.y,
            modifiers,
        })
    }

    pub fn pointer_move(&mut self, client: Point) -> bool {
        let p = self.view.screen_to_canvas(client);
        self.handle_event(&InputEvent::PointerMove { x: p.x, y: p.y })
    }

    pub fn pointer_up(&mut self, client: Point) -> bool {
        let p = self.view.screen_to_canvas(client);
        self.handle_event(&InputEvent::PointerUp { x: p.x, y: p.y })
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.handle_event(&InputEvent::PointerLeave)
    }

    /// Process one event in canvas coordinates. Returns `true` when the view
    /// needs repainting.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.exporting {
            log::debug!("export in progress, ignoring {event:?}");
            return false;
        }
        if let InputEvent::Key { key, modifiers } = event {
            return self.handle_key(key, *modifiers).is_some();
        }

        let target = match (event, &self.crop) {
            (InputEvent::PointerDown { x, y, .. }, Some(crop)) => {
                Target::Crop(hit_test_crop(crop.rect(), Point::new(*x, *y), self.config.handle_size))
            }
            (InputEvent::PointerDown { x, y, .. }, None) => Target::Canvas(hit_test(
                &self.engine.document.elements,
                self.selection,
                Point::new(*x, *y),
                self.config.handle_size,
            )),
            _ => Target::Canvas(CanvasHit::Empty),
        };

        let effects = self.machine.handle(event, self.tool, target, &self.engine.document.elements);
        let changed = !effects.is_empty();
        for effect in effects {
            self.apply_effect(effect);
        }
        changed
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Select(selection) => self.selection = selection,
            Effect::Create(variant, at) => self.create_element(variant, at),
            Effect::Mutate(mutation) => {
                if let Err(err) = self.engine.apply_mutation(mutation) {
                    log::warn!("dropping gesture: {err}");
                    self.machine.reset();
                }
            }
            Effect::CropDrag(delta) => {
                if let Some(crop) = self.crop.as_mut() {
                    crop.drag_by(delta);
                }
            }
            Effect::CropResize(corner, delta) => {
                if let Some(crop) = self.crop.as_mut() {
                    crop.resize(corner, delta);
                }
            }
        }
    }

    fn create_element(&mut self, variant: ElementVariant, at: Point) {
        let element = variant.create(at, self.engine.document.elements.next_z_index());
        let id = element.id;
        if let Err(err) = self.engine.apply_mutation(EditMutation::AddElement(element)) {
            log::warn!("could not add {}: {err}", variant.name());
            return;
        }
        self.selection = Some(id);
        self.tool = ToolKind::Select;
        let label = match variant {
            ElementVariant::Text => "Text",
            ElementVariant::Rectangle => "Rectangle",
            ElementVariant::Circle => "Circle",
        };
        self.notify(Notification::info(format!("{label} element added")));
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and run a shortcut. Returns the action when the key is bound,
    /// so the host can suppress the browser default.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if self.exporting {
            return None;
        }
        let action = ShortcutMap::resolve(key, modifiers)?;
        match action {
            ShortcutAction::Tool(tool) => {
                if let Err(err) = self.set_tool(tool) {
                    log::debug!("tool switch refused: {err}");
                }
            }
            ShortcutAction::Delete => {
                if self.crop.is_none() {
                    self.delete_selected();
                }
            }
            ShortcutAction::Deselect => {
                if !self.cancel_crop() {
                    self.selection = None;
                }
            }
            ShortcutAction::Layer(direction) => {
                if self.crop.is_none() {
                    self.reorder_selected(direction);
                }
            }
        }
        Some(action)
    }

    // ─── Tools & selection ───────────────────────────────────────────────

    /// Switch tools. Any non-select tool clears the selection; the crop tool
    /// enters crop mode and leaving it discards the crop in progress.
    ///
    /// # Errors
    /// From [`EditorController::begin_crop`] when switching to the crop tool;
    /// [`EditorError::ExportInProgress`] while exporting.
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<(), EditorError> {
        if self.exporting {
            return Err(EditorError::ExportInProgress);
        }
        if tool == ToolKind::Crop {
            return if self.crop.is_some() { Ok(()) } else { self.begin_crop() };
        }
        self.machine.reset();
        if self.crop.take().is_some() {
            log::debug!("crop cancelled by tool switch");
        }
        if tool != ToolKind::Select {
            self.selection = None;
        }
        log::debug!("tool: {}", tool.name());
        self.tool = tool;
        Ok(())
    }

    /// Select an element (or none). Selecting an element activates the
    /// select tool.
    ///
    /// # Errors
    /// [`EditorError::UnknownElement`] for an id not on the canvas.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), EditorError> {
        match id {
            Some(id) if !self.engine.document.elements.contains(id) => Err(EditorError::UnknownElement(id)),
            Some(id) => {
                self.set_tool(ToolKind::Select)?;
                self.selection = Some(id);
                Ok(())
            }
            None => {
                self.selection = None;
                Ok(())
            }
        }
    }

    // ─── Element edits ───────────────────────────────────────────────────

    /// Delete the selected element. Returns `false` with nothing selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        self.remove_element(id).is_ok()
    }

    /// # Errors
    /// [`EditorError::UnknownElement`], [`EditorError::ExportInProgress`].
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), EditorError> {
        self.guard_export()?;
        self.machine.reset();
        self.engine.apply_mutation(EditMutation::RemoveElement { id })?;
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.notify(Notification::info("Element deleted"));
        Ok(())
    }

    /// Move an element in the stack. Returns `Ok(false)` if it already sits
    /// at that end.
    ///
    /// # Errors
    /// [`EditorError::UnknownElement`], [`EditorError::ExportInProgress`].
    pub fn reorder(&mut self, id: ElementId, direction: LayerDirection) -> Result<bool, EditorError> {
        self.guard_export()?;
        let moved = self.engine.apply_mutation(EditMutation::Reorder { id, direction })?;
        if moved {
            self.notify(Notification::info(direction.message()));
        }
        Ok(moved)
    }

    pub fn reorder_selected(&mut self, direction: LayerDirection) -> bool {
        match self.selection {
            Some(id) => self.reorder(id, direction).unwrap_or(false),
            None => false,
        }
    }

    /// Property-panel edit.
    ///
    /// # Errors
    /// [`EditorError::UnknownElement`], patch validation errors,
    /// [`EditorError::ExportInProgress`].
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> Result<(), EditorError> {
        self.guard_export()?;
        self.engine.apply_mutation(EditMutation::Patch { id, patch })?;
        Ok(())
    }

    /// # Errors
    /// See [`PosterDocument::set_overlay_opacity`].
    pub fn set_overlay_opacity(&mut self, opacity: f64) -> Result<(), EditorError> {
        self.guard_export()?;
        self.engine.document.set_overlay_opacity(opacity)
    }

    // ─── Output dimensions ───────────────────────────────────────────────

    /// Change the output size. Existing elements are not rescaled; an active
    /// crop is refit to the new ratio.
    ///
    /// # Errors
    /// [`EditorError::InvalidAspectRatio`] for a zero side.
    pub fn set_dimensions(&mut self, dims: CanvasDimensions) -> Result<(), EditorError> {
        self.guard_export()?;
        let ratio = dims.aspect_ratio();
        if let Some(crop) = self.crop.as_mut() {
            crop.set_ratio(ratio)?;
        } else if !(ratio.is_finite() && ratio > 0.0) {
            return Err(EditorError::InvalidAspectRatio(ratio));
        }
        log::debug!("dimensions: {}x{} {}", dims.width, dims.height, dims.label);
        self.engine.document.dimensions = dims;
        Ok(())
    }

    /// Switch platform, landing on its first preset for the current format.
    ///
    /// # Errors
    /// See [`EditorController::set_dimensions`].
    pub fn select_platform(&mut self, platform: Platform) -> Result<(), EditorError> {
        let format = self.engine.document.dimensions.format;
        self.set_dimensions(CanvasDimensions::first_of(platform, format))
    }

    /// # Errors
    /// See [`EditorController::set_dimensions`].
    pub fn select_format(&mut self, format: PostFormat) -> Result<(), EditorError> {
        let platform = self.engine.document.dimensions.platform;
        self.set_dimensions(CanvasDimensions::first_of(platform, format))
    }

    /// Pick a preset by label for the current platform and format.
    ///
    /// # Errors
    /// [`EditorError::InvalidProperty`] for an unknown label.
    pub fn select_preset(&mut self, label: &str) -> Result<(), EditorError> {
        let current = &self.engine.document.dimensions;
        let dims = CanvasDimensions::preset(current.platform, current.format, label).ok_or_else(|| {
            EditorError::InvalidProperty {
                key: "dimension".into(),
                value: label.to_string(),
            }
        })?;
        self.set_dimensions(dims)
    }

    // ─── Background ──────────────────────────────────────────────────────

    /// Start using a new background photo. Leaves crop mode and drops the
    /// committed crop of the previous photo.
    ///
    /// # Errors
    /// [`EditorError::ExportInProgress`] while exporting.
    pub fn set_background(&mut self, url: &str) -> Result<(), EditorError> {
        self.guard_export()?;
        if self.crop.take().is_some() {
            self.tool = ToolKind::Select;
        }
        self.machine.reset();
        self.engine.document.begin_background(url);
        Ok(())
    }

    /// Use a search result as the background, loading its `large2x` variant.
    ///
    /// # Errors
    /// [`EditorError::ExportInProgress`] while exporting.
    pub fn select_photo(&mut self, photo: &Photo) -> Result<(), EditorError> {
        self.set_background(photo.background_url())?;
        self.notify(Notification::success(photo.selection_message()));
        Ok(())
    }

    /// The host finished loading `url`. Returns `Ok(false)` for a stale load.
    ///
    /// # Errors
    /// [`EditorError::DegenerateImage`] for a zero-sized photo;
    /// [`EditorError::ExportInProgress`] while exporting.
    pub fn background_loaded(&mut self, url: &str, natural: Size) -> Result<bool, EditorError> {
        self.guard_export()?;
        let container = self.crop_container();
        let result = self.engine.document.finish_background(url, natural, container);
        if result.is_err() {
            self.notify(Notification::error("Failed to load background image"));
        }
        result
    }

    /// # Errors
    /// [`EditorError::ExportInProgress`] while exporting.
    pub fn background_failed(&mut self, url: &str, reason: &str) -> Result<(), EditorError> {
        self.guard_export()?;
        if self.engine.document.background.url() == Some(url) {
            self.notify(Notification::error("Failed to load background image"));
        }
        self.engine.document.fail_background(url, reason);
        Ok(())
    }

    // ─── Crop ────────────────────────────────────────────────────────────

    /// Enter crop mode for the loaded background.
    ///
    /// # Errors
    /// [`EditorError::NoBackground`], [`EditorError::BackgroundNotReady`],
    /// [`EditorError::BackgroundFailed`] or a degenerate image; the editor
    /// stays in its current mode.
    pub fn begin_crop(&mut self) -> Result<(), EditorError> {
        self.guard_export()?;
        let session = match self.open_crop_session() {
            Ok(s) => s,
            Err(err) => {
                log::warn!("cannot crop: {err}");
                self.notify(Notification::error(format!("Cannot crop: {err}")));
                return Err(err);
            }
        };
        self.machine.reset();
        self.selection = None;
        self.tool = ToolKind::Crop;
        self.crop = Some(session);
        Ok(())
    }

    fn open_crop_session(&self) -> Result<CropSession, EditorError> {
        let doc = &self.engine.document;
        let natural = doc.background.metrics()?.natural;
        let metrics = ImageMetrics::fit_within(natural, self.crop_container())?;
        CropSession::begin(
            metrics,
            doc.dimensions.aspect_ratio(),
            doc.committed_crop,
            self.config.min_crop_size,
        )
    }

    /// Commit the crop box (converted to natural pixels) and leave crop
    /// mode.
    ///
    /// # Errors
    /// [`EditorError::CropInactive`] outside crop mode.
    pub fn apply_crop(&mut self) -> Result<Rect, EditorError> {
        let session = self.crop.take().ok_or(EditorError::CropInactive)?;
        let natural = session.apply();
        log::debug!("crop committed: {natural:?}");
        self.engine.document.committed_crop = Some(natural);
        self.machine.reset();
        self.tool = ToolKind::Select;
        self.notify(Notification::success("Crop applied successfully"));
        Ok(natural)
    }

    /// Leave crop mode without touching the committed crop. Returns `false`
    /// outside crop mode.
    pub fn cancel_crop(&mut self) -> bool {
        if self.crop.take().is_none() {
            return false;
        }
        self.machine.reset();
        self.tool = ToolKind::Select;
        true
    }

    // ─── Rendering & export ──────────────────────────────────────────────

    pub fn display_list(&self) -> DisplayList {
        build_display_list(&SceneView {
            document: &self.engine.document,
            canvas: self.engine.canvas,
            selected: self.selection,
            crop: self.crop.as_ref(),
            hide_transient: self.exporting,
            handle_size: self.config.handle_size,
        })
    }

    fn export_request(&self) -> ExportRequest {
        ExportRequest {
            root_id: self.config.export_root.clone(),
            scale: self.config.export_scale,
            use_cors: true,
            file_name: self.config.export_file_name.clone(),
        }
    }

    /// Freeze editing and hide transient UI for a capture. The host renders
    /// the returned request and reports back through
    /// [`EditorController::finish_export`].
    ///
    /// # Errors
    /// [`EditorError::ExportInProgress`], [`EditorError::InteractionActive`]
    /// (mid-gesture or in crop mode), or a background that is not ready.
    pub fn begin_export(&mut self) -> Result<ExportRequest, EditorError> {
        if self.exporting {
            return Err(EditorError::ExportInProgress);
        }
        if !self.machine.session().is_idle() || self.crop.is_some() {
            return Err(EditorError::InteractionActive);
        }
        if let Err(err) = self.engine.document.background.metrics() {
            self.notify(Notification::error("Please select a background image first"));
            return Err(err);
        }
        self.exporting = true;
        self.notify(Notification::info("Preparing your poster for download..."));
        Ok(self.export_request())
    }

    /// Resume editing after a capture.
    ///
    /// # Errors
    /// [`ExportError::NotStarted`] without a matching `begin_export`; the
    /// adapter's error or [`ExportError::Empty`] otherwise. Failures are also
    /// queued as a notification.
    pub fn finish_export(&mut self, output: Result<Vec<u8>, ExportError>) -> Result<ExportedImage, ExportError> {
        if !self.exporting {
            return Err(ExportError::NotStarted);
        }
        self.exporting = false;
        let request = self.export_request();
        match output.and_then(|bytes| export::accept_output(&request, bytes)) {
            Ok(image) => {
                log::debug!("exported {} bytes as {}", image.bytes.len(), image.file_name);
                self.notify(Notification::success("Poster downloaded successfully!"));
                Ok(image)
            }
            Err(err) => {
                log::warn!("export failed: {err}");
                self.notify(Notification::error("Failed to download poster. Please try again."));
                Err(err)
            }
        }
    }

    /// Run a full export through a synchronous adapter.
    ///
    /// # Errors
    /// As [`EditorController::begin_export`] and
    /// [`EditorController::finish_export`].
    pub fn export_with<A: RenderAdapter>(&mut self, adapter: &mut A) -> Result<ExportedImage, ExportError> {
        let request = self.begin_export()?;
        let frame = self.display_list();
        let output = adapter.render_flattened(&request, &frame);
        self.finish_export(output)
    }

    // ─── Notifications ───────────────────────────────────────────────────

    fn notify(&mut self, notification: Notification) {
        log::debug!("notify [{:?}] {}", notification.level, notification.message);
        self.notifications.push(notification);
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn guard_export(&self) -> Result<(), EditorError> {
        if self.exporting {
            Err(EditorError::ExportInProgress)
        } else {
            Ok(())
        }
    }
}
