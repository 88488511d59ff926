//! Native dialogs using the rfd crate
//!
//! The tab manager only needs two interactive decisions: where to save an
//! untitled document and what to do with unsaved changes on close. Both go
//! through the [`Dialogs`] trait so workflows can be driven without a
//! display.

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md", "log"];
const SOURCE_EXTENSIONS: &[&str] = &["java", "xml", "html", "css"];

/// Answer to the close prompt for a document with unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Interactive decisions needed by save and close workflows.
pub trait Dialogs {
    /// Ask for a save location. `None` means the user cancelled.
    fn pick_save_path(&mut self, suggested_name: &str) -> Option<PathBuf>;

    /// Ask whether to save `document_name` before closing it.
    fn confirm_close(&mut self, document_name: &str) -> CloseChoice;
}

/// rfd-backed dialogs remembering the last directory used.
#[derive(Debug, Default)]
pub struct NativeDialogs {
    last_dir: Option<PathBuf>,
}

impl NativeDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember_dir(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.last_dir = Some(parent.to_path_buf());
        }
    }

    /// Open dialog allowing several files.
    ///
    /// Returns an empty vector if the dialog was cancelled.
    pub fn pick_open_paths(&mut self) -> Vec<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Open Files")
            .add_filter("Text Files", TEXT_EXTENSIONS)
            .add_filter("Source Files", SOURCE_EXTENSIONS)
            .add_filter("All Files", &["*"]);

        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }

        let paths = dialog.pick_files().unwrap_or_default();
        if let Some(first) = paths.first() {
            self.remember_dir(first);
        }
        paths
    }
}

impl Dialogs for NativeDialogs {
    fn pick_save_path(&mut self, suggested_name: &str) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save File")
            .add_filter("Text Files", TEXT_EXTENSIONS)
            .add_filter("Source Files", SOURCE_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .set_file_name(suggested_name);

        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }

        let path = dialog.save_file()?;
        self.remember_dir(&path);
        Some(path)
    }

    fn confirm_close(&mut self, document_name: &str) -> CloseChoice {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Unsaved Changes")
            .set_description(format!(
                "Do you want to save changes to {}?",
                document_name
            ))
            .set_buttons(MessageButtons::YesNoCancel)
            .show();

        match result {
            MessageDialogResult::Yes => CloseChoice::Save,
            MessageDialogResult::No => CloseChoice::Discard,
            _ => CloseChoice::Cancel,
        }
    }
}
