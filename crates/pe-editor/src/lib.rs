pub mod editor;
pub mod engine;
pub mod input;
pub mod interaction;
pub mod notify;
pub mod shortcuts;
pub mod tools;

pub use editor::EditorController;
pub use engine::{EditMutation, MutationEngine};
pub use input::{InputEvent, Modifiers};
pub use interaction::Session;
pub use notify::{Notification, NotificationLevel};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
