//! Mutation engine: the only place the element model is written.
//!
//! The interaction state machine, the keyboard and the property panel all
//! describe their edits as `EditMutation`s; the engine applies them with the
//! canvas bounds and size floor in hand, so clamping lives in one place.

use pe_core::config::EditorConfig;
use pe_core::document::PosterDocument;
use pe_core::error::EditorError;
use pe_core::geometry::{Corner, clamp_position};
use pe_core::id::ElementId;
use pe_core::layers::LayerDirection;
use pe_core::model::{Element, ElementPatch};
use pe_core::{Point, Size, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub enum EditMutation {
    AddElement(Element),
    /// Move the top-left corner to `to`; clamped inside the canvas.
    MoveElement { id: ElementId, to: Point },
    /// Incremental resize from one handle.
    ResizeElement { id: ElementId, corner: Corner, delta: Vec2 },
    RemoveElement { id: ElementId },
    Reorder { id: ElementId, direction: LayerDirection },
    Patch { id: ElementId, patch: ElementPatch },
}

/// Holds the poster and the size of the canvas it is laid out on.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    pub document: PosterDocument,
    /// Layout size of the poster canvas; drag clamping bounds.
    pub canvas: Size,
    min_element_size: f64,
}

impl MutationEngine {
    pub fn new(config: &EditorConfig, canvas: Size) -> Self {
        Self {
            document: PosterDocument::new(config),
            canvas,
            min_element_size: config.min_element_size,
        }
    }

    /// Apply one mutation. Returns `Ok(false)` when it changed nothing (a
    /// layer move at the end of the stack).
    ///
    /// # Errors
    /// [`EditorError::UnknownElement`] for a stale id; patch validation
    /// errors from [`ElementPatch::apply`].
    pub fn apply_mutation(&mut self, mutation: EditMutation) -> Result<bool, EditorError> {
        let elements = &mut self.document.elements;
        match mutation {
            EditMutation::AddElement(element) => {
                log::debug!("add {} at ({}, {}) z={}", element.id, element.x, element.y, element.z_index);
                elements.add(element);
                Ok(true)
            }
            EditMutation::MoveElement { id, to } => {
                let el = elements.get_mut(id).ok_or(EditorError::UnknownElement(id))?;
                let to = if to.x.is_finite() && to.y.is_finite() { to } else { el.position() };
                let p = clamp_position(to, el.size(), self.canvas);
                el.x = p.x;
                el.y = p.y;
                Ok(true)
            }
            EditMutation::ResizeElement { id, corner, delta } => {
                let el = elements.get_mut(id).ok_or(EditorError::UnknownElement(id))?;
                el.resize_from_corner(corner, delta, self.min_element_size);
                Ok(true)
            }
            EditMutation::RemoveElement { id } => {
                elements.remove(id).ok_or(EditorError::UnknownElement(id))?;
                log::debug!("removed {id}");
                Ok(true)
            }
            EditMutation::Reorder { id, direction } => {
                if !elements.contains(id) {
                    return Err(EditorError::UnknownElement(id));
                }
                Ok(elements.reorder(id, direction))
            }
            EditMutation::Patch { id, patch } => {
                let el = elements.get_mut(id).ok_or(EditorError::UnknownElement(id))?;
                patch.apply(el, self.min_element_size)?;
                Ok(true)
            }
        }
    }
}
