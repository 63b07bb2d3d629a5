//! Input abstraction layer.
//!
//! Pointer events from the host page, already converted from client pixels to
//! canvas-local pixels, plus keyboard events.

use pe_core::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifiers: Modifiers },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Pointer left the canvas; ends a gesture like `PointerUp`.
    PointerLeave,
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Delete"`, `"]"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Point::new(*x, *y))
            }
            Self::PointerLeave | Self::Key { .. } => None,
        }
    }

    /// True for events that end a pointer gesture.
    pub fn ends_gesture(&self) -> bool {
        matches!(self, Self::PointerUp { .. } | Self::PointerLeave)
    }
}
