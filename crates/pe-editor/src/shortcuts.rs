//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. On macOS `meta`
//! is ⌘; elsewhere `ctrl` plays the same role.

use crate::input::Modifiers;
use crate::tools::ToolKind;
use pe_core::layers::LayerDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Tool(ToolKind),
    Delete,
    /// Clear the selection, or leave crop mode.
    Deselect,
    Layer(LayerDirection),
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. `key` is the `KeyboardEvent.key`
    /// value. Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            // Shift+[ arrives as "{" on most layouts, but not all.
            return match (key, modifiers.shift) {
                ("{", _) | ("[", true) => Some(ShortcutAction::Layer(LayerDirection::Bottom)),
                ("}", _) | ("]", true) => Some(ShortcutAction::Layer(LayerDirection::Top)),
                ("[", false) => Some(ShortcutAction::Layer(LayerDirection::Down)),
                ("]", false) => Some(ShortcutAction::Layer(LayerDirection::Up)),
                ("Delete" | "Backspace", _) => Some(ShortcutAction::Delete),
                _ => None,
            };
        }

        if modifiers.alt {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "v" | "V" => Some(ShortcutAction::Tool(ToolKind::Select)),
            "t" | "T" => Some(ShortcutAction::Tool(ToolKind::Text)),
            "r" | "R" => Some(ShortcutAction::Tool(ToolKind::Rectangle)),
            "o" | "O" => Some(ShortcutAction::Tool(ToolKind::Circle)),
            "c" | "C" => Some(ShortcutAction::Tool(ToolKind::Crop)),
            _ => None,
        }
    }
}
