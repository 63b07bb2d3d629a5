//! Canvas tools.
//!
//! The active tool decides what a pointer-down on empty canvas does. Drawing
//! tools create an element of their variant; the crop tool switches the view
//! to the crop engine.

use pe_core::model::ElementVariant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Rectangle,
    Circle,
    Crop,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Select,
        ToolKind::Text,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Text => "text",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Crop => "crop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Variant created by a click on empty canvas, for drawing tools.
    pub fn creates(self) -> Option<ElementVariant> {
        match self {
            ToolKind::Text => Some(ElementVariant::Text),
            ToolKind::Rectangle => Some(ElementVariant::Rectangle),
            ToolKind::Circle => Some(ElementVariant::Circle),
            ToolKind::Select | ToolKind::Crop => None,
        }
    }
}
