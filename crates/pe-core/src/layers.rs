//! Layer ordering: a pure reducer over element z-indices.
//!
//! Every operation leaves the z-indices as the dense sequence `1..=n` and the
//! slice sorted ascending by z, so paint order and array order agree.

use crate::id::ElementId;
use crate::model::Element;
use serde::{Deserialize, Serialize};

/// Where to move an element in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerDirection {
    Up,
    Down,
    Top,
    Bottom,
}

impl LayerDirection {
    pub const ALL: [LayerDirection; 4] = [
        LayerDirection::Up,
        LayerDirection::Down,
        LayerDirection::Top,
        LayerDirection::Bottom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerDirection::Up => "up",
            LayerDirection::Down => "down",
            LayerDirection::Top => "top",
            LayerDirection::Bottom => "bottom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Toast shown after a successful move.
    pub fn message(self) -> &'static str {
        match self {
            LayerDirection::Up => "Moved layer up",
            LayerDirection::Down => "Moved layer down",
            LayerDirection::Top => "Moved layer to front",
            LayerDirection::Bottom => "Moved layer to back",
        }
    }
}

/// Sort by z (stable, so ties keep insertion order) and renumber `1..=n`.
pub fn normalize(elements: &mut [Element]) {
    elements.sort_by_key(|e| e.z_index);
    for (i, el) in elements.iter_mut().enumerate() {
        el.z_index = i as u32 + 1;
    }
}

/// True when z-indices are exactly `1..=n` in array order.
pub fn is_dense(elements: &[Element]) -> bool {
    elements.iter().enumerate().all(|(i, e)| e.z_index == i as u32 + 1)
}

/// Move `target` in the stack. Returns `false` for an unknown id or when the
/// element already sits at the requested end.
pub fn reorder(elements: &mut [Element], target: ElementId, direction: LayerDirection) -> bool {
    normalize(elements);
    let n = elements.len();
    let Some(idx) = elements.iter().position(|e| e.id == target) else {
        return false;
    };
    let z = elements[idx].z_index;

    match direction {
        LayerDirection::Up => {
            if idx + 1 >= n {
                return false;
            }
            elements[idx].z_index += 1;
            elements[idx + 1].z_index -= 1;
        }
        LayerDirection::Down => {
            if idx == 0 {
                return false;
            }
            elements[idx].z_index -= 1;
            elements[idx - 1].z_index += 1;
        }
        LayerDirection::Top => {
            if idx + 1 >= n {
                return false;
            }
            for el in elements.iter_mut().filter(|e| e.z_index > z) {
                el.z_index -= 1;
            }
            elements[idx].z_index = n as u32;
        }
        LayerDirection::Bottom => {
            if idx == 0 {
                return false;
            }
            for el in elements.iter_mut().filter(|e| e.z_index < z) {
                el.z_index += 1;
            }
            elements[idx].z_index = 1;
        }
    }

    elements.sort_by_key(|e| e.z_index);
    log::debug!("layer {target} moved {}", direction.name());
    true
}
