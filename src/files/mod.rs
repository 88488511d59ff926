//! File operations module for Quire
//!
//! Native open/save dialogs, the close prompt, and the recent-files registry.

pub mod dialogs;
pub mod recent;

pub use dialogs::{CloseChoice, Dialogs, NativeDialogs};
pub use recent::{RecentFiles, MAX_RECENT_FILES, RECENT_FILES_NAME};
