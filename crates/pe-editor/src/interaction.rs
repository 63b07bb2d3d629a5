//! Pointer interaction state machine.
//!
//! ```text
//!            down on element (select)         move: MoveElement
//!   Idle ───────────────────────────────▶ DraggingElement ──┐
//!    │  down on handle of selected          move: ResizeElement
//!    ├──────────────────────────────────▶ ResizingElement ──┤
//!    │  down on crop box                    move: crop drag   │ up / leave
//!    ├──────────────────────────────────▶ DraggingCrop ─────┤
//!    │  down on crop handle                 move: crop resize │
//!    └──────────────────────────────────▶ ResizingCrop ─────┴──▶ Idle
//! ```
//!
//! Pointer-downs on empty canvas stay in `Idle`: they clear the selection
//! (select tool) or create an element (drawing tools). Moves without an
//! active session are ignored. Nothing is mutated on up; every change is
//! applied live during moves.

use crate::engine::EditMutation;
use crate::input::InputEvent;
use crate::tools::ToolKind;
use pe_core::geometry::Corner;
use pe_core::id::ElementId;
use pe_core::model::{ElementModel, ElementVariant};
use pe_core::{Point, Vec2};
use pe_render::hit::{CanvasHit, CropHit};

/// The in-flight gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    /// `grab` is pointer − element top-left at press time.
    DraggingElement { id: ElementId, grab: Vec2 },
    /// `last` is the previous pointer sample; deltas are incremental.
    ResizingElement { id: ElementId, corner: Corner, last: Point },
    DraggingCrop { last: Point },
    ResizingCrop { corner: Corner, last: Point },
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::DraggingElement { .. } => "dragging-element",
            Session::ResizingElement { .. } => "resizing-element",
            Session::DraggingCrop { .. } => "dragging-crop",
            Session::ResizingCrop { .. } => "resizing-crop",
        }
    }
}

/// What was under the pointer at press time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Canvas(CanvasHit),
    Crop(CropHit),
}

/// Side effects requested by the state machine; the controller carries
/// them out in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Select(Option<ElementId>),
    /// Create an element of this variant with its top-left at the point.
    Create(ElementVariant, Point),
    Mutate(EditMutation),
    CropDrag(Vec2),
    CropResize(Corner, Vec2),
}

#[derive(Debug, Default)]
pub struct InteractionMachine {
    session: Session,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Drop any gesture without further effects.
    pub fn reset(&mut self) {
        self.session = Session::Idle;
    }

    /// Feed one pointer event (canvas coordinates). Key events are not
    /// handled here.
    pub fn handle(&mut self, event: &InputEvent, tool: ToolKind, target: Target, elements: &ElementModel) -> Vec<Effect> {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.down(Point::new(*x, *y), tool, target, elements),
            InputEvent::PointerMove { x, y } => self.moved(Point::new(*x, *y)),
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                if !self.session.is_idle() {
                    log::debug!("{} ended", self.session.name());
                }
                self.session = Session::Idle;
                vec![]
            }
            InputEvent::Key { .. } => vec![],
        }
    }

    fn down(&mut self, p: Point, tool: ToolKind, target: Target, elements: &ElementModel) -> Vec<Effect> {
        // A press without a release (pointer lost outside the window) simply
        // starts over.
        self.session = Session::Idle;

        match target {
            Target::Crop(CropHit::Handle(corner)) => {
                self.session = Session::ResizingCrop { corner, last: p };
                vec![]
            }
            Target::Crop(CropHit::Body) => {
                self.session = Session::DraggingCrop { last: p };
                vec![]
            }
            Target::Crop(CropHit::Outside) => vec![],

            Target::Canvas(CanvasHit::Handle(id, corner)) if tool == ToolKind::Select => {
                self.session = Session::ResizingElement { id, corner, last: p };
                vec![]
            }
            Target::Canvas(CanvasHit::Element(id)) if tool == ToolKind::Select => {
                let Some(el) = elements.get(id) else {
                    return vec![];
                };
                self.session = Session::DraggingElement {
                    id,
                    grab: p - el.position(),
                };
                vec![Effect::Select(Some(id))]
            }
            Target::Canvas(CanvasHit::Empty) => match tool.creates() {
                Some(variant) => vec![Effect::Create(variant, p)],
                None if tool == ToolKind::Select => vec![Effect::Select(None)],
                None => vec![],
            },
            // Drawing tools ignore presses that land on an element.
            Target::Canvas(_) => vec![],
        }
    }

    fn moved(&mut self, p: Point) -> Vec<Effect> {
        match &mut self.session {
            Session::Idle => vec![],
            Session::DraggingElement { id, grab } => vec![Effect::Mutate(EditMutation::MoveElement {
                id: *id,
                to: p - *grab,
            })],
            Session::ResizingElement { id, corner, last } => {
                let delta = p - *last;
                *last = p;
                vec![Effect::Mutate(EditMutation::ResizeElement {
                    id: *id,
                    corner: *corner,
                    delta,
                })]
            }
            Session::DraggingCrop { last } => {
                let delta = p - *last;
                *last = p;
                vec![Effect::CropDrag(delta)]
            }
            Session::ResizingCrop { corner, last } => {
                let delta = p - *last;
                *last = p;
                vec![Effect::CropResize(*corner, delta)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use pretty_assertions::assert_eq;

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    fn model_with_text() -> (ElementModel, ElementId) {
        let mut model = ElementModel::new();
        let el = ElementVariant::Text.create(Point::new(50.0, 50.0), 1);
        let id = el.id;
        model.add(el);
        (model, id)
    }

    #[test]
    fn press_on_element_starts_drag_and_selects() {
        let (model, id) = model_with_text();
        let mut m = InteractionMachine::new();
        let fx = m.handle(&down(60.0, 55.0), ToolKind::Select, Target::Canvas(CanvasHit::Element(id)), &model);
        assert_eq!(fx, vec![Effect::Select(Some(id))]);
        assert_eq!(
            m.session(),
            Session::DraggingElement {
                id,
                grab: Vec2::new(10.0, 5.0)
            }
        );

        let fx = m.handle(&InputEvent::PointerMove { x: 40.0, y: 45.0 }, ToolKind::Select, Target::Canvas(CanvasHit::Empty), &model);
        assert_eq!(
            fx,
            vec![Effect::Mutate(EditMutation::MoveElement {
                id,
                to: Point::new(30.0, 40.0)
            })]
        );
    }

    #[test]
    fn resize_deltas_are_incremental() {
        let (model, id) = model_with_text();
        let mut m = InteractionMachine::new();
        let target = Target::Canvas(CanvasHit::Handle(id, Corner::BottomRight));
        m.handle(&down(250.0, 100.0), ToolKind::Select, target, &model);

        let mv = |x, y| InputEvent::PointerMove { x, y };
        let first = m.handle(&mv(260.0, 100.0), ToolKind::Select, target, &model);
        let second = m.handle(&mv(265.0, 110.0), ToolKind::Select, target, &model);
        let delta = |fx: &[Effect]| match fx {
            [Effect::Mutate(EditMutation::ResizeElement { delta, .. })] => *delta,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(delta(first.as_slice()), Vec2::new(10.0, 0.0));
        assert_eq!(delta(second.as_slice()), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn empty_press_with_select_clears_selection() {
        let (model, _) = model_with_text();
        let mut m = InteractionMachine::new();
        let fx = m.handle(&down(700.0, 500.0), ToolKind::Select, Target::Canvas(CanvasHit::Empty), &model);
        assert_eq!(fx, vec![Effect::Select(None)]);
        assert!(m.session().is_idle());
    }

    #[test]
    fn drawing_tool_creates_on_empty_only() {
        let (model, id) = model_with_text();
        let mut m = InteractionMachine::new();
        let fx = m.handle(&down(300.0, 300.0), ToolKind::Circle, Target::Canvas(CanvasHit::Empty), &model);
        assert_eq!(fx, vec![Effect::Create(ElementVariant::Circle, Point::new(300.0, 300.0))]);

        let fx = m.handle(&down(60.0, 60.0), ToolKind::Circle, Target::Canvas(CanvasHit::Element(id)), &model);
        assert!(fx.is_empty());
        assert!(m.session().is_idle());
    }

    #[test]
    fn stale_move_and_up_are_ignored() {
        let (model, _) = model_with_text();
        let mut m = InteractionMachine::new();
        let t = Target::Canvas(CanvasHit::Empty);
        assert!(m.handle(&InputEvent::PointerMove { x: 1.0, y: 1.0 }, ToolKind::Select, t, &model).is_empty());
        assert!(m.handle(&InputEvent::PointerUp { x: 1.0, y: 1.0 }, ToolKind::Select, t, &model).is_empty());
    }

    #[test]
    fn leave_ends_crop_drag() {
        let model = ElementModel::new();
        let mut m = InteractionMachine::new();
        let t = Target::Crop(CropHit::Body);
        m.handle(&down(300.0, 200.0), ToolKind::Crop, t, &model);
        let fx = m.handle(&InputEvent::PointerMove { x: 310.0, y: 190.0 }, ToolKind::Crop, t, &model);
        assert_eq!(fx, vec![Effect::CropDrag(Vec2::new(10.0, -10.0))]);
        m.handle(&InputEvent::PointerLeave, ToolKind::Crop, t, &model);
        assert!(m.session().is_idle());
    }
}
