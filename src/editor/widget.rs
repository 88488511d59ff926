//! Text editor widget for Quire
//!
//! This module binds one [`EditorTab`] to egui's multiline `TextEdit`.
//! Text edits flow from the view into the tab's buffer every frame;
//! programmatic caret and selection moves (find, select all, paste) flow
//! the other way through the text edit's stored cursor state.

use super::tab::{EditorTab, MONOSPACED_FONT};
use eframe::egui::{self, FontFamily, FontId, ScrollArea, TextEdit, Ui};
use log::debug;
use std::sync::Arc;

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Whether the content was modified.
    pub changed: bool,
}

/// A text editor widget that integrates with the tab state.
///
/// # Example
///
/// ```ignore
/// EditorWidget::new(&mut tab)
///     .id(egui::Id::new("editor").with(tab_id))
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    /// The tab being edited.
    tab: &'a mut EditorTab,
    /// ID for the editor (for state persistence).
    id: Option<egui::Id>,
}

impl<'a> EditorWidget<'a> {
    /// Create a new editor widget for the given tab.
    pub fn new(tab: &'a mut EditorTab) -> Self {
        Self { tab, id: None }
    }

    /// Set a custom ID for the editor.
    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let id = self
            .id
            .unwrap_or_else(|| ui.id().with("editor").with(self.tab.id()));

        // Push a pending programmatic selection into the TextEdit state.
        // Focus stays where it is: a find window keeps its keyboard input.
        if let Some((anchor, caret)) = self.tab.buffer.take_view_sync() {
            let mut state = TextEdit::load_state(ui.ctx(), id).unwrap_or_default();
            state
                .cursor
                .set_char_range(Some(egui::text::CCursorRange::two(
                    egui::text::CCursor::new(anchor),
                    egui::text::CCursor::new(caret),
                )));
            state.store(ui.ctx(), id);
        }

        let mut content = self.tab.buffer.text().to_string();

        let font_size = self.tab.font_size();
        let word_wrap = self.tab.word_wrap();
        let font_id = FontId::new(font_size, font_family_for(self.tab.font_name()));

        let layout_font = font_id.clone();
        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let layout_job = if word_wrap {
                egui::text::LayoutJob::simple(
                    text.to_owned(),
                    layout_font.clone(),
                    ui.visuals().text_color(),
                    wrap_width,
                )
            } else {
                egui::text::LayoutJob::simple_singleline(
                    text.to_owned(),
                    layout_font.clone(),
                    ui.visuals().text_color(),
                )
            };
            ui.fonts(|f| f.layout_job(layout_job))
        };

        let scroll_area = if word_wrap {
            ScrollArea::vertical()
        } else {
            ScrollArea::both()
        };

        let text_output = scroll_area
            .id_source(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                TextEdit::multiline(&mut content)
                    .id(id)
                    .frame(false)
                    .font(font_id.clone())
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .layouter(&mut layouter)
                    .show(ui)
            })
            .inner;

        let changed = content != self.tab.buffer.text();
        if changed {
            self.tab.buffer.set_text(content);
            debug!("Editor content changed in tab {}", self.tab.id());
        }

        if let Some(cursor_range) = text_output.cursor_range {
            self.tab.buffer.sync_from_view(
                cursor_range.primary.ccursor.index,
                cursor_range.secondary.ccursor.index,
            );
        }

        EditorOutput { changed }
    }
}

/// egui font family for a tab's effective font name.
///
/// egui ships one monospaced and one proportional family; every other
/// family name renders proportionally.
pub fn font_family_for(font_name: &str) -> FontFamily {
    if font_name.eq_ignore_ascii_case(MONOSPACED_FONT) || font_name.eq_ignore_ascii_case("monospace")
    {
        FontFamily::Monospace
    } else {
        FontFamily::Proportional
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
