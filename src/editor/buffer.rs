//! Document buffer for Quire
//!
//! A `DocumentBuffer` owns the editable text of one tab together with the
//! caret, the current selection and the dirty flag. All positions are
//! character offsets into the text.

use crate::clipboard::Clipboard;
use crate::error::Result;
use crate::string_utils::{char_count, char_index_to_byte_index};

/// Editable text with caret, selection and modification tracking.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuffer {
    /// Document content
    text: String,
    /// Caret position (character offset)
    caret: usize,
    /// Selected span as (start, end) character offsets, start < end
    selection: Option<(usize, usize)>,
    /// Whether the content changed since the last load or save
    dirty: bool,
    /// Set when the caret or selection was moved programmatically and the
    /// view has not picked it up yet
    view_sync_pending: bool,
}

impl DocumentBuffer {
    /// Create an empty, clean buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clean buffer holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the document in characters.
    pub fn len_chars(&self) -> usize {
        char_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// The currently selected text, if any.
    pub fn selected_text(&self) -> Option<&str> {
        self.selection.map(|(start, end)| self.slice(start, end))
    }

    /// 1-based (line, column) of the caret.
    ///
    /// The line is the number of newlines before the caret plus one; the
    /// column is the number of characters since the last newline plus one.
    pub fn line_column(&self) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for ch in self.text.chars().take(self.caret) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load / Save State
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the whole content with text read from disk.
    ///
    /// The buffer is clean afterwards and the caret returns to the start.
    pub fn load(&mut self, text: String) {
        self.text = text;
        self.caret = 0;
        self.selection = None;
        self.dirty = false;
        self.view_sync_pending = true;
    }

    /// Mark the current content as saved.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Caret & Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the caret, clearing any selection.
    pub fn set_caret(&mut self, pos: usize) {
        self.caret = pos.min(self.len_chars());
        self.selection = None;
        self.view_sync_pending = true;
    }

    /// Select `[start, end)` and put the caret at `end`.
    ///
    /// Bounds are clamped to the document; an empty span just moves the caret.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.len_chars();
        let (start, end) = (start.min(len), end.min(len));
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.selection = if lo < hi { Some((lo, hi)) } else { None };
        self.caret = end;
        self.view_sync_pending = true;
    }

    pub fn select_all(&mut self) {
        let len = self.len_chars();
        self.select(0, len);
    }

    /// Update caret and selection from the view without requesting a sync back.
    ///
    /// `primary` is where the caret is, `secondary` the other end of the selection.
    pub fn sync_from_view(&mut self, primary: usize, secondary: usize) {
        let len = self.len_chars();
        let (primary, secondary) = (primary.min(len), secondary.min(len));
        self.caret = primary;
        self.selection = match primary.cmp(&secondary) {
            std::cmp::Ordering::Less => Some((primary, secondary)),
            std::cmp::Ordering::Greater => Some((secondary, primary)),
            std::cmp::Ordering::Equal => None,
        };
    }

    /// Take the pending programmatic caret/selection change, if any.
    ///
    /// Returns the (anchor, caret) pair the view should display.
    pub fn take_view_sync(&mut self) -> Option<(usize, usize)> {
        if !std::mem::take(&mut self.view_sync_pending) {
            return None;
        }
        match self.selection {
            Some((start, end)) if self.caret == start => Some((end, start)),
            Some((start, end)) => Some((start, end)),
            None => Some((self.caret, self.caret)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace `[start, end)` with `replacement`.
    ///
    /// The caret moves to the end of the inserted text and the selection is
    /// cleared. Marks the buffer dirty if the content actually changed.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        let len = self.len_chars();
        let (start, end) = (start.min(len), end.min(len).max(start.min(len)));
        let byte_start = char_index_to_byte_index(&self.text, start);
        let byte_end = char_index_to_byte_index(&self.text, end);

        if self.text[byte_start..byte_end] != *replacement {
            self.text.replace_range(byte_start..byte_end, replacement);
            self.dirty = true;
        }
        self.caret = start + char_count(replacement);
        self.selection = None;
        self.view_sync_pending = true;
    }

    /// Type `text` at the caret, replacing the selection if there is one.
    pub fn insert(&mut self, text: &str) {
        let (start, end) = self.selection.unwrap_or((self.caret, self.caret));
        self.replace_range(start, end, text);
    }

    /// Replace the whole content as the result of a user edit in the view.
    ///
    /// Marks dirty only if the text differs. The caret is clamped to the new
    /// length; the view reports the real position right after.
    pub fn set_text(&mut self, text: String) {
        if text == self.text {
            return;
        }
        self.text = text;
        self.dirty = true;
        let len = self.len_chars();
        self.caret = self.caret.min(len);
        self.selection = self
            .selection
            .map(|(s, e)| (s.min(len), e.min(len)))
            .filter(|(s, e)| s < e);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipboard Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the selection to the clipboard. Does nothing without a selection.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> Result<()> {
        if let Some(selected) = self.selected_text() {
            clipboard.set_text(selected)?;
        }
        Ok(())
    }

    /// Copy the selection to the clipboard and delete it.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<()> {
        if let Some((start, end)) = self.selection {
            clipboard.set_text(self.slice(start, end))?;
            self.replace_range(start, end, "");
        }
        Ok(())
    }

    /// Insert the clipboard text at the caret, replacing the selection.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(text) = clipboard.get_text() {
            self.insert(&text);
        }
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        let byte_start = char_index_to_byte_index(&self.text, start);
        let byte_end = char_index_to_byte_index(&self.text, end);
        &self.text[byte_start..byte_end]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
