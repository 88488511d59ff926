//! Editor tabs for Quire
//!
//! An `EditorTab` couples a [`DocumentBuffer`] to an optional backing file
//! and carries the per-tab display state: word wrap, syntax hint, font and
//! zoom level.

use super::buffer::DocumentBuffer;
use crate::clipboard::Clipboard;
use crate::error::{Error, Result};
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Font family used when a tab carries a syntax hint.
pub const MONOSPACED_FONT: &str = "Monospaced";

/// Smallest font size zooming out can reach.
pub const MIN_ZOOM_SIZE: f32 = 1.0;

/// Largest font size zooming in can reach.
pub const MAX_ZOOM_SIZE: f32 = 72.0;

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Hint
// ─────────────────────────────────────────────────────────────────────────────

/// Language hint for a tab.
///
/// The hint only selects the display font class; no tokenization happens.
/// Plain text is represented by the absence of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxHint {
    Java,
    Xml,
    Css,
}

impl SyntaxHint {
    /// Infer a hint from a file name (`.java`, `.xml`/`.html`, `.css`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".java") {
            Some(Self::Java)
        } else if name.ends_with(".xml") || name.ends_with(".html") {
            Some(Self::Xml)
        } else if name.ends_with(".css") {
            Some(Self::Css)
        } else {
            None
        }
    }

    /// Short identifier ("java", "xml", "css").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Xml => "xml",
            Self::Css => "css",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::Xml => "XML/HTML",
            Self::Css => "CSS",
        }
    }

    pub fn all() -> &'static [SyntaxHint] {
        &[Self::Java, Self::Xml, Self::Css]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Line
// ─────────────────────────────────────────────────────────────────────────────

/// Data rendered in the status bar for the active tab.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Absolute path, or "Untitled"
    pub file: String,
    pub font_name: String,
    pub font_size: f32,
    /// 1-based caret line
    pub line: usize,
    /// 1-based caret column
    pub column: usize,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}, {}pt | Ln {}, Col {}",
            self.file,
            self.font_name,
            self.font_size.round() as i64,
            self.line,
            self.column
        )
    }
}

/// Parse a font size typed into the toolbar.
pub fn parse_font_size(text: &str) -> Result<f32> {
    match text.trim().parse::<f32>() {
        Ok(size) if size.is_finite() && size > 0.0 => Ok(size.clamp(MIN_ZOOM_SIZE, MAX_ZOOM_SIZE)),
        _ => Err(Error::InvalidFontSize(text.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Tab
// ─────────────────────────────────────────────────────────────────────────────

/// One open document.
#[derive(Debug, Clone)]
pub struct EditorTab {
    /// Unique identifier for this tab
    id: usize,
    /// File path (None until the first successful save)
    path: Option<PathBuf>,
    /// Document content, caret and dirty flag
    pub buffer: DocumentBuffer,
    /// Whether long lines wrap in the view
    word_wrap: bool,
    /// Language hint picking the font class
    syntax: Option<SyntaxHint>,
    /// Chosen font family
    font_family: String,
    /// Current font size in points (changes with zoom)
    font_size: f32,
}

impl EditorTab {
    /// Create an empty, clean, untitled tab.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            path: None,
            buffer: DocumentBuffer::new(),
            word_wrap: false,
            syntax: None,
            font_family: MONOSPACED_FONT.to_string(),
            font_size: 12.0,
        }
    }

    /// Set the initial font and wrap state.
    #[must_use]
    pub fn with_style(mut self, font_family: &str, font_size: f32, word_wrap: bool) -> Self {
        self.font_family = font_family.to_string();
        self.font_size = font_size.clamp(MIN_ZOOM_SIZE, MAX_ZOOM_SIZE);
        self.word_wrap = word_wrap;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    /// File name, or "Untitled" for tabs that were never saved.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }

    /// Tab strip title: the display name, prefixed with `*` while dirty.
    pub fn title(&self) -> String {
        if self.is_dirty() {
            format!("*{}", self.display_name())
        } else {
            self.display_name()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O
    // ─────────────────────────────────────────────────────────────────────────

    /// Read `path` into the buffer and adopt it as the backing file.
    ///
    /// On failure the tab is left untouched.
    pub fn load_from(&mut self, path: PathBuf) -> Result<()> {
        let content = fs::read_to_string(&path).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })?;
        self.buffer.load(content);
        self.syntax = SyntaxHint::from_path(&path);
        debug!(
            "Loaded {} (syntax hint: {:?})",
            path.display(),
            self.syntax.map(|s| s.as_str())
        );
        self.path = Some(path);
        Ok(())
    }

    /// Write the whole buffer to `path`.
    ///
    /// The path is adopted and the tab marked clean only after the write
    /// succeeded; on failure path and dirty flag are unchanged.
    pub fn save_to(&mut self, path: PathBuf) -> Result<()> {
        fs::write(&path, self.buffer.text()).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        self.buffer.mark_clean();
        info!("Saved file: {}", path.display());
        self.path = Some(path);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing Commands
    // ─────────────────────────────────────────────────────────────────────────

    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<()> {
        self.buffer.cut(clipboard)
    }

    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> Result<()> {
        self.buffer.copy(clipboard)
    }

    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        self.buffer.paste(clipboard)
    }

    pub fn select_all(&mut self) {
        self.buffer.select_all()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Display State
    // ─────────────────────────────────────────────────────────────────────────

    pub fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    pub fn set_word_wrap(&mut self, wrap: bool) {
        self.word_wrap = wrap;
    }

    pub fn syntax(&self) -> Option<SyntaxHint> {
        self.syntax
    }

    pub fn set_syntax_highlighting(&mut self, hint: Option<SyntaxHint>) {
        self.syntax = hint;
    }

    /// The font family actually used for display.
    ///
    /// Any syntax hint forces the monospaced family.
    pub fn font_name(&self) -> &str {
        if self.syntax.is_some() {
            MONOSPACED_FONT
        } else {
            &self.font_family
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn set_font(&mut self, family: &str, size: f32) {
        self.font_family = family.to_string();
        self.font_size = size.clamp(MIN_ZOOM_SIZE, MAX_ZOOM_SIZE);
    }

    pub fn zoom_in(&mut self) {
        self.font_size = (self.font_size + 1.0).min(MAX_ZOOM_SIZE);
    }

    /// Shrink the font by one point; never below [`MIN_ZOOM_SIZE`].
    pub fn zoom_out(&mut self) {
        if self.font_size > MIN_ZOOM_SIZE {
            self.font_size = (self.font_size - 1.0).max(MIN_ZOOM_SIZE);
        }
    }

    pub fn reset_zoom(&mut self, default_size: f32) {
        self.font_size = default_size.clamp(MIN_ZOOM_SIZE, MAX_ZOOM_SIZE);
    }

    /// Status bar data for this tab.
    pub fn status_line(&self) -> StatusLine {
        let (line, column) = self.buffer.line_column();
        StatusLine {
            file: self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Untitled".to_string()),
            font_name: self.font_name().to_string(),
            font_size: self.font_size,
            line,
            column,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
