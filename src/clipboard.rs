//! Clipboard access for cut/copy/paste
//!
//! Buffer editing commands talk to a [`Clipboard`] trait object so the same
//! code runs against the system clipboard (via the arboard crate) in the app
//! and against an in-memory clipboard in tests or headless environments.

use crate::error::{Error, Result};
use log::warn;

/// Minimal clipboard interface used by the document buffer.
pub trait Clipboard {
    /// Current clipboard text, if any.
    fn get_text(&mut self) -> Option<String>;

    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// System Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// The platform clipboard.
///
/// If the platform clipboard cannot be opened (no display server, sandbox),
/// falls back to an in-process clipboard so cut/copy/paste still work
/// between tabs.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    fallback: MemoryClipboard,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!("System clipboard unavailable, using in-memory clipboard: {}", e);
                None
            }
        };
        Self {
            inner,
            fallback: MemoryClipboard::default(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match self.inner.as_mut() {
            Some(clipboard) => clipboard.get_text().ok(),
            None => self.fallback.get_text(),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| Error::Clipboard(e.to_string())),
            None => self.fallback.set_text(text),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
