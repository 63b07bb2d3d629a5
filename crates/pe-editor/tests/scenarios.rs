//! Integration tests: editor controller driven through pointer and keyboard
//! events, exercising pe-core, pe-render and pe-editor together.

use pe_core::config::EditorConfig;
use pe_core::dimensions::{Platform, PostFormat};
use pe_core::layers::is_dense;
use pe_core::model::{Color, ElementKind, ElementPatch};
use pe_core::{EditorError, Point, Rect, Size};
use pe_editor::{EditorController, Modifiers, NotificationLevel, Session, ToolKind};
use pe_render::export::{ExportError, ExportRequest};
use pe_render::paint::{DisplayList, DrawOp};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> EditorController {
    init_logging();
    let mut ed = EditorController::new(EditorConfig::default());
    ed.set_canvas_size(Size::new(800.0, 600.0));
    ed
}

/// Editor with an 1600×900 photo shown at 800×450 in the crop view.
fn editor_with_background() -> EditorController {
    let mut ed = editor();
    ed.set_crop_viewport(Size::new(800.0, 450.0));
    ed.set_background("https://images.example.com/beach.jpg").unwrap();
    assert!(ed
        .background_loaded("https://images.example.com/beach.jpg", Size::new(1600.0, 900.0))
        .unwrap());
    ed
}

fn press(ed: &mut EditorController, x: f64, y: f64) {
    ed.pointer_down(Point::new(x, y), Modifiers::NONE);
}

fn click(ed: &mut EditorController, x: f64, y: f64) {
    press(ed, x, y);
    ed.pointer_up(Point::new(x, y));
}

fn create(ed: &mut EditorController, tool: ToolKind, x: f64, y: f64) -> pe_core::ElementId {
    ed.set_tool(tool).unwrap();
    click(ed, x, y);
    ed.selection().expect("new element is selected")
}

fn cmd() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    }
}

// ─── Element creation & selection ────────────────────────────────────────

#[test]
fn text_click_creates_selected_element() {
    let mut ed = editor();
    let id = create(&mut ed, ToolKind::Text, 50.0, 50.0);

    let el = ed.selected_element().unwrap();
    assert_eq!(el.id, id);
    assert_eq!(el.bounds(), Rect::new(50.0, 50.0, 250.0, 100.0));
    assert_eq!(el.z_index, 1);
    assert!(matches!(&el.kind, ElementKind::Text { font_size, .. } if *font_size == 24.0));
    assert_eq!(ed.tool(), ToolKind::Select);

    let toasts = ed.drain_notifications();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Text element added");
}

#[test]
fn new_elements_stack_on_top() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    create(&mut ed, ToolKind::Circle, 400.0, 10.0);
    let third = create(&mut ed, ToolKind::Text, 10.0, 300.0);
    let z: Vec<u32> = ed.elements().iter().map(|e| e.z_index).collect();
    assert_eq!(z, vec![1, 2, 3]);
    assert_eq!(ed.elements()[2].id, third);
}

#[test]
fn clicking_empty_canvas_deselects() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    click(&mut ed, 700.0, 500.0);
    assert_eq!(ed.selection(), None);
}

#[test]
fn clicking_element_with_drawing_tool_does_nothing() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    ed.set_tool(ToolKind::Circle).unwrap();
    click(&mut ed, 50.0, 50.0);
    assert_eq!(ed.elements().len(), 1);
    assert_eq!(ed.selection(), None);
    assert_eq!(ed.tool(), ToolKind::Circle);
}

// ─── Drag & resize ───────────────────────────────────────────────────────

#[test]
fn drag_by_pointer_delta() {
    let mut ed = editor();
    let id = create(&mut ed, ToolKind::Text, 50.0, 50.0);

    press(&mut ed, 60.0, 60.0);
    assert!(matches!(ed.session(), Session::DraggingElement { .. }));
    ed.pointer_move(Point::new(40.0, 50.0));
    ed.pointer_up(Point::new(40.0, 50.0));

    let el = ed.elements().iter().find(|e| e.id == id).unwrap();
    assert_eq!(el.position(), Point::new(30.0, 40.0));
    assert!(ed.session().is_idle());
}

#[test]
fn drag_clamps_at_canvas_edges() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 100.0, 100.0);
    press(&mut ed, 150.0, 150.0);
    ed.pointer_move(Point::new(5000.0, -5000.0));
    ed.pointer_leave();
    let el = &ed.elements()[0];
    assert_eq!(el.position(), Point::new(700.0, 0.0));
}

#[test]
fn move_after_leave_is_ignored() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 100.0, 100.0);
    press(&mut ed, 150.0, 150.0);
    ed.pointer_leave();
    assert!(!ed.pointer_move(Point::new(300.0, 300.0)));
    assert_eq!(ed.elements()[0].position(), Point::new(100.0, 100.0));
}

#[test]
fn resize_from_top_left_handle() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Rectangle, 100.0, 100.0);

    // Top-left handle of the selected 100×100 box.
    press(&mut ed, 101.0, 101.0);
    assert!(matches!(ed.session(), Session::ResizingElement { .. }));
    ed.pointer_move(Point::new(121.0, 91.0));
    ed.pointer_move(Point::new(131.0, 81.0));
    ed.pointer_up(Point::new(131.0, 81.0));

    let el = &ed.elements()[0];
    assert_eq!(el.bounds(), Rect::new(130.0, 80.0, 200.0, 200.0));
}

#[test]
fn resize_below_floor_lands_on_floor() {
    let mut ed = editor();
    create(&mut ed, ToolKind::Circle, 100.0, 100.0);
    press(&mut ed, 200.0, 200.0);
    ed.pointer_move(Point::new(-400.0, -400.0));
    ed.pointer_up(Point::new(-400.0, -400.0));
    assert_eq!(ed.elements()[0].size(), Size::new(20.0, 20.0));
}

// ─── Layers & deletion ───────────────────────────────────────────────────

#[test]
fn bring_bottom_element_to_front() {
    let mut ed = editor();
    let a = create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    let b = create(&mut ed, ToolKind::Rectangle, 20.0, 20.0);
    let c = create(&mut ed, ToolKind::Rectangle, 30.0, 30.0);

    ed.select(Some(a)).unwrap();
    ed.drain_notifications();
    ed.handle_key("}", Modifiers { shift: true, ..cmd() });

    let order: Vec<_> = ed.elements().iter().map(|e| (e.id, e.z_index)).collect();
    assert_eq!(order, vec![(b, 1), (c, 2), (a, 3)]);
    assert_eq!(ed.drain_notifications()[0].message, "Moved layer to front");
}

#[test]
fn bracket_keys_step_layers() {
    let mut ed = editor();
    let a = create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    let b = create(&mut ed, ToolKind::Rectangle, 20.0, 20.0);

    ed.handle_key("[", cmd());
    assert_eq!(ed.elements()[0].id, b);
    ed.handle_key("]", cmd());
    assert_eq!(ed.elements()[0].id, a);
    assert!(is_dense(ed.elements()));
}

#[test]
fn delete_key_removes_and_clears_selection() {
    let mut ed = editor();
    let keep = create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    let gone = create(&mut ed, ToolKind::Circle, 300.0, 300.0);

    ed.handle_key("Delete", Modifiers::NONE);
    assert_eq!(ed.selection(), None);
    assert!(ed.elements().iter().all(|e| e.id != gone));
    assert_eq!(ed.elements().len(), 1);
    assert_eq!(ed.elements()[0].id, keep);

    // Nothing selected: a second Delete is harmless.
    ed.handle_key("Backspace", Modifiers::NONE);
    assert_eq!(ed.elements().len(), 1);
}

#[test]
fn z_index_after_delete_does_not_collide() {
    let mut ed = editor();
    let first = create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    create(&mut ed, ToolKind::Rectangle, 200.0, 10.0);
    ed.remove_element(first).unwrap();
    create(&mut ed, ToolKind::Rectangle, 400.0, 10.0);
    let z: Vec<u32> = ed.elements().iter().map(|e| e.z_index).collect();
    assert_eq!(z, vec![1, 2]);
}

// ─── Property panel ──────────────────────────────────────────────────────

#[test]
fn property_edits_apply_to_element() {
    let mut ed = editor();
    let id = create(&mut ed, ToolKind::Text, 10.0, 10.0);
    ed.update_element(
        id,
        ElementPatch {
            content: Some("Grand Opening".into()),
            font_family: Some("Georgia".into()),
            stroke: Color::from_css("#9b87f5"),
            ..Default::default()
        },
    )
    .unwrap();
    let el = ed.selected_element().unwrap();
    assert_eq!(el.style.stroke.to_hex(), "#9B87F5");
    assert!(matches!(&el.kind, ElementKind::Text { content, font_family, .. }
        if content == "Grand Opening" && font_family == "Georgia"));

    let bad = ed.update_element(
        id,
        ElementPatch {
            font_size: Some(f64::NAN),
            ..Default::default()
        },
    );
    assert!(matches!(bad, Err(EditorError::InvalidProperty { .. })));
}

// ─── Crop ────────────────────────────────────────────────────────────────

#[test]
fn crop_starts_centered_for_square_output() {
    let mut ed = editor_with_background();
    ed.set_tool(ToolKind::Crop).unwrap();
    assert_eq!(ed.crop().unwrap().rect(), Rect::new(175.0, 0.0, 625.0, 450.0));
    assert_eq!(ed.selection(), None);
}

#[test]
fn crop_drag_resize_apply_and_reenter() {
    let mut ed = editor_with_background();
    ed.set_tool(ToolKind::Crop).unwrap();

    // Shrink from the bottom-right handle, then drag the box.
    press(&mut ed, 625.0, 450.0);
    assert!(matches!(ed.session(), Session::ResizingCrop { .. }));
    ed.pointer_move(Point::new(525.0, 450.0));
    ed.pointer_up(Point::new(525.0, 450.0));
    assert_eq!(ed.crop().unwrap().rect(), Rect::new(175.0, 0.0, 525.0, 350.0));

    press(&mut ed, 300.0, 100.0);
    ed.pointer_move(Point::new(325.0, 150.0));
    ed.pointer_up(Point::new(325.0, 150.0));
    assert_eq!(ed.crop().unwrap().rect(), Rect::new(200.0, 50.0, 550.0, 400.0));

    let natural = ed.apply_crop().unwrap();
    assert_eq!(natural, Rect::new(400.0, 100.0, 1100.0, 800.0));
    assert_eq!(ed.document().committed_crop, Some(natural));
    assert_eq!(ed.tool(), ToolKind::Select);

    ed.set_tool(ToolKind::Crop).unwrap();
    assert_eq!(ed.crop().unwrap().rect(), Rect::new(200.0, 50.0, 550.0, 400.0));
}

#[test]
fn cancel_keeps_previous_commit() {
    let mut ed = editor_with_background();
    ed.set_tool(ToolKind::Crop).unwrap();
    let committed = ed.apply_crop().unwrap();

    ed.set_tool(ToolKind::Crop).unwrap();
    press(&mut ed, 400.0, 200.0);
    ed.pointer_move(Point::new(300.0, 200.0));
    ed.pointer_up(Point::new(300.0, 200.0));
    assert!(ed.cancel_crop());
    assert_eq!(ed.document().committed_crop, Some(committed));
}

#[test]
fn dimension_change_refits_active_crop() {
    let mut ed = editor_with_background();
    ed.set_tool(ToolKind::Crop).unwrap();
    ed.select_platform(Platform::Facebook).unwrap();
    let dims = &ed.document().dimensions;
    assert_eq!((dims.width, dims.height), (1200, 630));

    let r = ed.crop().unwrap().rect();
    assert!((r.width() / r.height() - 1200.0 / 630.0).abs() < 1e-9);

    ed.select_format(PostFormat::Story).unwrap();
    assert_eq!(ed.document().dimensions.label, "Story (9:16)");
    assert!(ed.select_preset("Square (1:1)").is_err());
}

#[test]
fn crop_requires_loaded_background() {
    let mut ed = editor();
    ed.set_background("slow.jpg").unwrap();
    assert!(matches!(ed.begin_crop(), Err(EditorError::BackgroundNotReady)));
    ed.background_failed("slow.jpg", "404").unwrap();
    assert!(matches!(ed.begin_crop(), Err(EditorError::BackgroundFailed(_))));

    // Elements can still be placed.
    create(&mut ed, ToolKind::Text, 10.0, 10.0);
    assert_eq!(ed.elements().len(), 1);
}

#[test]
fn crop_ui_replaces_elements_in_display_list() {
    let mut ed = editor_with_background();
    create(&mut ed, ToolKind::Text, 10.0, 10.0);
    ed.set_tool(ToolKind::Crop).unwrap();
    let list = ed.display_list();
    assert!(list.ops.iter().any(|op| matches!(op, DrawOp::Shade { .. })));
    assert!(!list.ops.iter().any(|op| matches!(op, DrawOp::Text { .. })));
}

// ─── Export ──────────────────────────────────────────────────────────────

#[test]
fn export_hides_selection_and_reports_success() {
    let mut ed = editor_with_background();
    create(&mut ed, ToolKind::Circle, 10.0, 10.0);
    ed.drain_notifications();

    let mut captured = None;
    let mut adapter = |req: &ExportRequest, frame: &DisplayList| {
        captured = Some((req.clone(), frame.clone()));
        Ok::<_, ExportError>(vec![1, 2, 3])
    };
    let image = ed.export_with(&mut adapter).unwrap();
    assert_eq!(image.file_name, "poster.png");

    let (req, frame) = captured.unwrap();
    assert_eq!(req.root_id, "poster-canvas");
    assert_eq!(req.scale, 2.0);
    assert!(req.use_cors);
    assert!(!frame.ops.iter().any(|op| matches!(op, DrawOp::Outline { .. } | DrawOp::Handle { .. })));

    let toasts = ed.drain_notifications();
    assert_eq!(toasts.last().unwrap().level, NotificationLevel::Success);
    assert!(!ed.is_exporting());
}

#[test]
fn empty_export_is_a_failure_and_editing_continues() {
    let mut ed = editor_with_background();
    let mut adapter = |_: &ExportRequest, _: &DisplayList| Ok::<_, ExportError>(Vec::new());
    assert!(matches!(ed.export_with(&mut adapter), Err(ExportError::Empty)));
    assert_eq!(ed.drain_notifications().last().unwrap().level, NotificationLevel::Error);

    create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    assert_eq!(ed.elements().len(), 1);
}

#[test]
fn export_refused_mid_gesture_and_without_background() {
    let mut ed = editor();
    assert!(matches!(ed.begin_export(), Err(EditorError::NoBackground)));

    let mut ed = editor_with_background();
    create(&mut ed, ToolKind::Rectangle, 10.0, 10.0);
    press(&mut ed, 50.0, 50.0);
    assert!(matches!(ed.begin_export(), Err(EditorError::InteractionActive)));
    ed.pointer_up(Point::new(50.0, 50.0));

    ed.begin_export().unwrap();
    assert!(matches!(ed.begin_export(), Err(EditorError::ExportInProgress)));
    ed.finish_export(Ok(vec![0])).unwrap();
    assert!(matches!(ed.finish_export(Ok(vec![0])), Err(ExportError::NotStarted)));
}

#[test]
fn background_and_crop_are_frozen_during_export() {
    let mut ed = editor_with_background();
    ed.set_tool(ToolKind::Crop).unwrap();
    let committed = ed.apply_crop().unwrap();
    ed.begin_export().unwrap();

    assert!(matches!(ed.set_background("other.jpg"), Err(EditorError::ExportInProgress)));
    assert!(matches!(
        ed.background_loaded("https://images.example.com/beach.jpg", Size::new(10.0, 10.0)),
        Err(EditorError::ExportInProgress)
    ));
    assert!(matches!(
        ed.background_failed("https://images.example.com/beach.jpg", "gone"),
        Err(EditorError::ExportInProgress)
    ));
    assert!(!ed.set_canvas_size(Size::new(300.0, 300.0)));
    assert!(!ed.set_crop_viewport(Size::new(300.0, 300.0)));

    assert_eq!(ed.document().committed_crop, Some(committed));
    assert_eq!(ed.document().background.url(), Some("https://images.example.com/beach.jpg"));
    assert!(ed.document().background.is_ready());
    assert_eq!(ed.canvas_size(), Size::new(800.0, 600.0));

    ed.finish_export(Ok(vec![1])).unwrap();
    ed.set_background("other.jpg").unwrap();
    assert_eq!(ed.document().committed_crop, None);
}

// ─── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn drags_never_leave_the_canvas(
        start in (0.0..700.0f64, 0.0..500.0f64),
        moves in prop::collection::vec((-2000.0..2000.0f64, -2000.0..2000.0f64), 1..25),
    ) {
        let mut ed = editor();
        ed.set_tool(ToolKind::Rectangle).unwrap();
        click(&mut ed, start.0, start.1);
        let el = ed.selected_element().unwrap().clone();

        press(&mut ed, el.x + 50.0, el.y + 50.0);
        for (x, y) in moves {
            ed.pointer_move(Point::new(x, y));
            let el = &ed.elements()[0];
            prop_assert!(el.x >= 0.0 && el.x <= 800.0 - el.width, "x = {}", el.x);
            prop_assert!(el.y >= 0.0 && el.y <= 600.0 - el.height, "y = {}", el.y);
        }
        ed.pointer_up(Point::ZERO);
    }
}
