//! Editor module for Quire
//!
//! Document buffers, editor tabs, find/replace and the egui text widget.

mod buffer;
mod find_replace;
mod tab;
mod widget;

pub use find_replace::{FindMode, FindReplacePanel, FindSession};
pub use tab::{parse_font_size, EditorTab, StatusLine, SyntaxHint, MONOSPACED_FONT};
pub use widget::EditorWidget;
