//! Hit testing: point → element, resize handle or crop box part.
//!
//! Reverse-walks the elements (front-to-back) so the highest z-index wins.
//! Handles of the selected element are checked first because they are drawn
//! on top of everything.

use pe_core::geometry::Corner;
use pe_core::id::ElementId;
use pe_core::model::ElementModel;
use pe_core::{Point, Rect};

/// What a pointer-down on the poster canvas landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasHit {
    /// A resize handle of the selected element.
    Handle(ElementId, Corner),
    Element(ElementId),
    Empty,
}

/// What a pointer-down in crop mode landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHit {
    Handle(Corner),
    Body,
    Outside,
}

/// Square hit area of side `size` centred on `corner` of `rect`.
pub fn handle_rect(rect: Rect, corner: Corner, size: f64) -> Rect {
    let c = corner.of(rect);
    let half = size / 2.0;
    Rect::new(c.x - half, c.y - half, c.x + half, c.y + half)
}

/// The corner handle of `rect` under `p`, if any.
pub fn handle_at(rect: Rect, p: Point, size: f64) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|&c| handle_rect(rect, c, size).contains(p))
}

/// Topmost element containing `p`. Returns `None` on empty canvas.
pub fn element_at(elements: &ElementModel, p: Point) -> Option<ElementId> {
    elements.iter().rev().find(|e| e.contains(p)).map(|e| e.id)
}

pub fn hit_test(elements: &ElementModel, selected: Option<ElementId>, p: Point, handle_size: f64) -> CanvasHit {
    if let Some(id) = selected
        && let Some(el) = elements.get(id)
        && let Some(corner) = handle_at(el.bounds(), p, handle_size)
    {
        return CanvasHit::Handle(id, corner);
    }
    match element_at(elements, p) {
        Some(id) => CanvasHit::Element(id),
        None => CanvasHit::Empty,
    }
}

pub fn hit_test_crop(crop: Rect, p: Point, handle_size: f64) -> CropHit {
    if let Some(corner) = handle_at(crop, p, handle_size) {
        CropHit::Handle(corner)
    } else if crop.contains(p) {
        CropHit::Body
    } else {
        CropHit::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pe_core::model::ElementVariant;
    use pretty_assertions::assert_eq;

    fn two_overlapping() -> (ElementModel, ElementId, ElementId) {
        let mut model = ElementModel::new();
        let a = ElementVariant::Rectangle.create(Point::new(10.0, 10.0), model.next_z_index());
        let a_id = a.id;
        model.add(a);
        let b = ElementVariant::Circle.create(Point::new(60.0, 60.0), model.next_z_index());
        let b_id = b.id;
        model.add(b);
        (model, a_id, b_id)
    }

    #[test]
    fn topmost_wins() {
        let (model, a, b) = two_overlapping();
        assert_eq!(hit_test(&model, None, Point::new(80.0, 80.0), 10.0), CanvasHit::Element(b));
        assert_eq!(hit_test(&model, None, Point::new(20.0, 20.0), 10.0), CanvasHit::Element(a));
        assert_eq!(hit_test(&model, None, Point::new(500.0, 500.0), 10.0), CanvasHit::Empty);
    }

    #[test]
    fn layer_order_changes_the_winner() {
        let (mut model, a, _) = two_overlapping();
        model.reorder(a, pe_core::LayerDirection::Top);
        assert_eq!(hit_test(&model, None, Point::new(80.0, 80.0), 10.0), CanvasHit::Element(a));
    }

    #[test]
    fn rotated_element_hit_follows_its_painted_outline() {
        let mut model = ElementModel::new();
        let below = ElementVariant::Rectangle.create(Point::new(10.0, 10.0), model.next_z_index());
        let a = below.id;
        model.add(below);
        let mut top = ElementVariant::Rectangle.create(Point::new(60.0, 60.0), model.next_z_index());
        top.rotation = Some(45.0);
        let b = top.id;
        model.add(top);
        // The top-left corner of `b`'s box is empty once it turns, so the
        // press falls through to `a`.
        assert_eq!(hit_test(&model, None, Point::new(65.0, 65.0), 10.0), CanvasHit::Element(a));
        // Above the unrotated box, but under the turned corner.
        assert_eq!(hit_test(&model, None, Point::new(115.0, 50.0), 10.0), CanvasHit::Element(b));
    }

    #[test]
    fn handles_only_for_selected_element() {
        let (model, a, _) = two_overlapping();
        // Bottom-right corner of `a` is (110, 110), inside `b` as well.
        let p = Point::new(112.0, 108.0);
        assert_eq!(hit_test(&model, Some(a), p, 10.0), CanvasHit::Handle(a, Corner::BottomRight));
        assert!(matches!(hit_test(&model, None, p, 10.0), CanvasHit::Element(_)));
    }

    #[test]
    fn crop_parts() {
        let crop = Rect::new(175.0, 0.0, 625.0, 450.0);
        assert_eq!(hit_test_crop(crop, Point::new(176.0, 2.0), 10.0), CropHit::Handle(Corner::TopLeft));
        assert_eq!(hit_test_crop(crop, Point::new(400.0, 200.0), 10.0), CropHit::Body);
        assert_eq!(hit_test_crop(crop, Point::new(50.0, 200.0), 10.0), CropHit::Outside);
    }
}
