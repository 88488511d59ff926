//! Find and Replace for Quire
//!
//! A `FindSession` lives as long as the find window is open. It keeps the
//! search options and the end of the previous match, and operates directly
//! on the active tab's [`DocumentBuffer`]:
//! - Find Next starting at the caret (or after the previous match), wrapping
//!   once to the start of the document
//! - Replace of the current selection when it is a match
//! - Replace All in a single forward pass
//!
//! Case sensitivity, whole word and regex mode all compile into one
//! [`Regex`]; plain terms are escaped first.

use super::buffer::DocumentBuffer;
use crate::error::{Error, Result};
use crate::string_utils::{byte_index_to_char_index, char_index_to_byte_index, char_len_at};
use eframe::egui::{self, Color32, Key, RichText, Ui, Vec2};
use log::debug;
use regex::{Captures, Regex};

// ─────────────────────────────────────────────────────────────────────────────
// Find Session
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the find window also shows the replace controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FindMode {
    #[default]
    Find,
    Replace,
}

/// Search cursor over one document.
#[derive(Debug, Clone, Default)]
pub struct FindSession {
    /// Current search term
    pub search_term: String,
    /// Current replacement text
    pub replace_term: String,
    /// Whether search is case-sensitive
    pub case_sensitive: bool,
    /// Whether to match whole words only
    pub whole_word: bool,
    /// Whether the search term is a regular expression
    pub use_regex: bool,
    /// Find or find-and-replace
    pub mode: FindMode,
    /// Character offset just past the previous match
    last_match_end: Option<usize>,
    /// Tab the previous match was found in
    tab_id: Option<usize>,
}

impl FindSession {
    pub fn new(mode: FindMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn last_match_end(&self) -> Option<usize> {
        self.last_match_end
    }

    /// Forget the previous match, e.g. after the term or options changed.
    pub fn reset(&mut self) {
        self.last_match_end = None;
    }

    /// Point the session at the tab about to be searched.
    ///
    /// A different tab than last time forgets the previous match, so the
    /// search starts from that tab's caret.
    pub fn attach(&mut self, tab_id: usize) {
        if self.tab_id != Some(tab_id) {
            self.reset();
            self.tab_id = Some(tab_id);
        }
    }

    /// Compile the current term and options.
    ///
    /// Returns `Ok(None)` for an empty term.
    pub fn matcher(&self) -> Result<Option<Regex>> {
        if self.search_term.is_empty() {
            return Ok(None);
        }

        let body = if self.use_regex {
            self.search_term.clone()
        } else {
            regex::escape(&self.search_term)
        };
        let body = if self.whole_word {
            format!(r"\b(?:{})\b", body)
        } else {
            body
        };
        let pattern = if self.case_sensitive {
            body
        } else {
            format!("(?i){}", body)
        };

        Regex::new(&pattern)
            .map(Some)
            .map_err(|e| Error::InvalidPattern {
                pattern: self.search_term.clone(),
                message: e.to_string(),
            })
    }

    /// Select the next match and move the caret to its end.
    ///
    /// Searching starts at the later of the caret and the previous match end
    /// and wraps to the beginning once. Returns the selected span as
    /// character offsets, or `None` if a full pass found nothing.
    pub fn find_next(&mut self, buffer: &mut DocumentBuffer) -> Result<Option<(usize, usize)>> {
        let Some(re) = self.matcher()? else {
            return Ok(None);
        };

        let text = buffer.text();
        let from = buffer
            .caret()
            .max(self.last_match_end.unwrap_or(0))
            .min(buffer.len_chars());
        let from_byte = char_index_to_byte_index(text, from);

        let found = next_match(&re, text, from_byte).or_else(|| {
            if from_byte > 0 {
                debug!("Find wrapped to start of document");
                next_match(&re, text, 0)
            } else {
                None
            }
        });

        match found {
            Some((start_byte, end_byte)) => {
                let start = byte_index_to_char_index(text, start_byte);
                let end = byte_index_to_char_index(text, end_byte);
                buffer.select(start, end);
                self.last_match_end = Some(end);
                Ok(Some((start, end)))
            }
            None => {
                self.last_match_end = None;
                Ok(None)
            }
        }
    }

    /// Replace the selection if it is exactly a match, then find the next one.
    ///
    /// Returns the span selected by the follow-up search.
    pub fn replace(&mut self, buffer: &mut DocumentBuffer) -> Result<Option<(usize, usize)>> {
        let Some(re) = self.matcher()? else {
            return Ok(None);
        };

        if let Some((start, end)) = buffer.selection() {
            let text = buffer.text();
            let start_byte = char_index_to_byte_index(text, start);
            let end_byte = char_index_to_byte_index(text, end);

            let replacement = re.captures_at(text, start_byte).and_then(|caps| {
                let whole = caps.get(0)?;
                (whole.start() == start_byte && whole.end() == end_byte)
                    .then(|| self.replacement_for(&caps))
            });

            if let Some(replacement) = replacement {
                buffer.replace_range(start, end, &replacement);
                self.last_match_end = Some(buffer.caret());
            }
        }

        self.find_next(buffer)
    }

    /// Replace every match from the start of the document.
    ///
    /// Text inserted by a replacement is never searched again, so a
    /// replacement containing the term terminates. Returns the count.
    pub fn replace_all(&mut self, buffer: &mut DocumentBuffer) -> Result<usize> {
        let Some(re) = self.matcher()? else {
            return Ok(0);
        };

        let text = buffer.text();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut pos = 0;
        let mut count = 0;

        while pos <= text.len() {
            let Some(caps) = re.captures_at(text, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if whole.start() == whole.end() {
                let step = char_len_at(text, whole.start());
                if step == 0 {
                    break;
                }
                pos = whole.start() + step;
                continue;
            }

            out.push_str(&text[copied..whole.start()]);
            out.push_str(&self.replacement_for(&caps));
            copied = whole.end();
            pos = whole.end();
            count += 1;
        }

        if count > 0 {
            out.push_str(&text[copied..]);
            let len = buffer.len_chars();
            buffer.replace_range(0, len, &out);
            buffer.set_caret(0);
        }
        self.last_match_end = None;
        debug!("Replaced {} occurrence(s) of '{}'", count, self.search_term);
        Ok(count)
    }

    fn replacement_for(&self, caps: &Captures<'_>) -> String {
        if self.use_regex {
            let mut dst = String::new();
            caps.expand(&self.replace_term, &mut dst);
            dst
        } else {
            self.replace_term.clone()
        }
    }
}

/// First non-empty match at or after byte `from`, as byte offsets.
fn next_match(re: &Regex, text: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    while pos <= text.len() {
        let m = re.find_at(text, pos)?;
        if m.start() < m.end() {
            return Some((m.start(), m.end()));
        }
        let step = char_len_at(text, m.start());
        if step == 0 {
            return None;
        }
        pos = m.start() + step;
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Find/Replace Panel
// ─────────────────────────────────────────────────────────────────────────────

/// Output from the FindReplacePanel.
#[derive(Debug, Clone, Default)]
pub struct FindReplacePanelOutput {
    /// Whether the search term or options changed
    pub search_changed: bool,
    /// Whether to move to the next match
    pub next_requested: bool,
    /// Whether to replace the current match
    pub replace_requested: bool,
    /// Whether to replace all matches
    pub replace_all_requested: bool,
    /// Whether to close the panel
    pub close_requested: bool,
}

/// Floating find/replace window.
pub struct FindReplacePanel {
    /// Whether the search input should be focused
    focus_search: bool,
    /// Result of the last action ("Not found", "Replaced 3 occurrences", ...)
    message: String,
}

impl Default for FindReplacePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FindReplacePanel {
    pub fn new() -> Self {
        Self {
            focus_search: true,
            message: String::new(),
        }
    }

    /// Request focus on the search input.
    pub fn request_focus(&mut self) {
        self.focus_search = true;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Show the find/replace window.
    ///
    /// Returns output indicating any actions to perform.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        session: &mut FindSession,
        is_dark: bool,
    ) -> FindReplacePanelOutput {
        let mut output = FindReplacePanelOutput::default();

        let muted_color = if is_dark {
            Color32::from_rgb(140, 140, 140)
        } else {
            Color32::from_rgb(120, 120, 120)
        };
        let accent_color = if is_dark {
            Color32::from_rgb(100, 180, 255)
        } else {
            Color32::from_rgb(0, 120, 212)
        };

        let title = match session.mode {
            FindMode::Find => "Find",
            FindMode::Replace => "Replace",
        };

        egui::Window::new(title)
            .id(egui::Id::new("find_replace_panel"))
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::RIGHT_TOP, [-16.0, 48.0])
            .show(ctx, |ui| {
                ui.set_min_width(380.0);

                let (escape, enter, f3) = ui.input(|i| {
                    (
                        i.key_pressed(Key::Escape),
                        i.key_pressed(Key::Enter),
                        i.key_pressed(Key::F3),
                    )
                });
                if escape {
                    output.close_requested = true;
                }
                if f3 {
                    output.next_requested = true;
                }

                egui::Grid::new("find_replace_grid")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Find:");
                        let search_response = ui.add_sized(
                            Vec2::new(260.0, 22.0),
                            egui::TextEdit::singleline(&mut session.search_term)
                                .id(egui::Id::new("find_replace_search_input"))
                                .hint_text("Search..."),
                        );
                        // Enter in the search field finds the next match and
                        // keeps the field focused for the following Enter
                        if search_response.lost_focus() && enter {
                            output.next_requested = true;
                            self.focus_search = true;
                        }
                        if self.focus_search {
                            search_response.request_focus();
                            self.focus_search = false;
                        }
                        if search_response.changed() {
                            output.search_changed = true;
                        }
                        ui.end_row();

                        if session.mode == FindMode::Replace {
                            ui.label("Replace:");
                            ui.add_sized(
                                Vec2::new(260.0, 22.0),
                                egui::TextEdit::singleline(&mut session.replace_term)
                                    .hint_text("Replace with..."),
                            );
                            ui.end_row();
                        }
                    });

                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    for (label, tooltip, flag) in [
                        ("Aa", "Match Case", &mut session.case_sensitive),
                        ("W", "Whole Word", &mut session.whole_word),
                        (".*", "Regular Expression", &mut session.use_regex),
                    ] {
                        if ui
                            .add(toggle_button(label, tooltip, *flag, is_dark, accent_color))
                            .clicked()
                        {
                            *flag = !*flag;
                            output.search_changed = true;
                        }
                    }

                    ui.add_space(12.0);

                    let has_term = !session.search_term.is_empty();
                    if ui
                        .add_enabled(has_term, egui::Button::new("Find Next"))
                        .on_hover_text("F3 or Enter")
                        .clicked()
                    {
                        output.next_requested = true;
                    }

                    if session.mode == FindMode::Replace {
                        if ui
                            .add_enabled(has_term, egui::Button::new("Replace"))
                            .clicked()
                        {
                            output.replace_requested = true;
                        }
                        if ui
                            .add_enabled(has_term, egui::Button::new("Replace All"))
                            .clicked()
                        {
                            output.replace_all_requested = true;
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                    });
                });

                if !self.message.is_empty() {
                    ui.add_space(4.0);
                    ui.label(RichText::new(&self.message).size(11.0).color(muted_color));
                }
            });

        if output.search_changed {
            self.message.clear();
        }

        output
    }
}

/// Create a toggle button widget.
fn toggle_button<'a>(
    label: &'a str,
    tooltip: &'a str,
    active: bool,
    is_dark: bool,
    accent_color: Color32,
) -> impl egui::Widget + 'a {
    move |ui: &mut Ui| -> egui::Response {
        let text_color = if active {
            accent_color
        } else if is_dark {
            Color32::from_rgb(160, 160, 160)
        } else {
            Color32::from_rgb(100, 100, 100)
        };

        let border_color = if active {
            accent_color
        } else if is_dark {
            Color32::from_rgb(70, 70, 70)
        } else {
            Color32::from_rgb(180, 180, 180)
        };

        ui.add(
            egui::Button::new(RichText::new(label).size(12.0).color(text_color).strong())
                .fill(Color32::TRANSPARENT)
                .stroke(egui::Stroke::new(1.0, border_color))
                .min_size(Vec2::new(28.0, 22.0)),
        )
        .on_hover_text(tooltip)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session(term: &str) -> FindSession {
        FindSession {
            search_term: term.to_string(),
            ..FindSession::default()
        }
    }

    /// Buffer as it looks right after the user typed `text`.
    fn typed(text: &str) -> DocumentBuffer {
        let mut buffer = DocumentBuffer::new();
        buffer.insert(text);
        buffer
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find Next
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_next_wraps_and_refinds_single_match() {
        let mut buffer = typed("hello world");
        assert_eq!(buffer.caret(), 11);

        let mut find = session("world");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 11)));
        assert_eq!(buffer.caret(), 11);
        assert_eq!(buffer.selected_text(), Some("world"));

        // No further match: wraps and finds the same one again
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 11)));
        assert_eq!(buffer.caret(), 11);
        assert_eq!(buffer.selection(), Some((6, 11)));
    }

    #[test]
    fn test_attach_to_other_tab_forgets_previous_match() {
        let mut first = typed("one two");
        let mut find = session("two");
        find.attach(1);
        assert_eq!(find.find_next(&mut first).unwrap(), Some((4, 7)));
        assert_eq!(find.last_match_end(), Some(7));

        let mut second = DocumentBuffer::with_text("two xx two");
        find.attach(2);
        assert_eq!(find.last_match_end(), None);
        assert_eq!(find.find_next(&mut second).unwrap(), Some((0, 3)));

        // Same tab again keeps advancing
        find.attach(2);
        assert_eq!(find.find_next(&mut second).unwrap(), Some((7, 10)));
    }

    #[test]
    fn test_find_next_advances_through_matches() {
        let mut buffer = DocumentBuffer::with_text("ab ab ab");
        let mut find = session("ab");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 2)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((3, 5)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 8)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 2)));
    }

    #[test]
    fn test_find_next_starts_at_caret() {
        let mut buffer = DocumentBuffer::with_text("cat cat cat");
        buffer.set_caret(5);
        let mut find = session("cat");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((8, 11)));
    }

    #[test]
    fn test_find_next_not_found() {
        let mut buffer = DocumentBuffer::with_text("hello world");
        buffer.set_caret(3);
        let mut find = session("xyz");
        assert_eq!(find.find_next(&mut buffer).unwrap(), None);
        assert_eq!(buffer.caret(), 3);
        assert!(buffer.selection().is_none());
        assert!(find.last_match_end().is_none());
    }

    #[test]
    fn test_find_next_empty_term_finds_nothing() {
        let mut buffer = DocumentBuffer::with_text("anything");
        let mut find = session("");
        assert_eq!(find.find_next(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let mut buffer = DocumentBuffer::with_text("Hello HELLO");
        let mut find = session("hello");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 5)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 11)));
    }

    #[test]
    fn test_case_sensitive() {
        let mut buffer = DocumentBuffer::with_text("Hello hello");
        let mut find = session("hello");
        find.case_sensitive = true;
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 11)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 11)));
    }

    #[test]
    fn test_whole_word() {
        let mut buffer = DocumentBuffer::with_text("cat concat cat_ cat.");
        let mut find = session("cat");
        find.whole_word = true;
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 3)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((16, 19)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 3)));
    }

    #[test]
    fn test_plain_term_is_literal() {
        let mut buffer = DocumentBuffer::with_text("a+b aab");
        let mut find = session("a+b");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 3)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 3)));
    }

    #[test]
    fn test_regex_mode() {
        let mut buffer = DocumentBuffer::with_text("id=42 id=7");
        let mut find = session(r"id=\d+");
        find.use_regex = true;
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((0, 5)));
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((6, 10)));
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let mut buffer = DocumentBuffer::with_text("text");
        let mut find = session("(unclosed");
        find.use_regex = true;
        let err = find.find_next(&mut buffer).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_find_uses_character_offsets() {
        let mut buffer = DocumentBuffer::with_text("påske på fjellet");
        let mut find = session("fjellet");
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((9, 16)));
    }

    #[test]
    fn test_regex_skips_empty_matches() {
        let mut buffer = DocumentBuffer::with_text("xx1x");
        let mut find = session(r"\d*");
        find.use_regex = true;
        assert_eq!(find.find_next(&mut buffer).unwrap(), Some((2, 3)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_selected_match_then_advances() {
        let mut buffer = DocumentBuffer::with_text("one two one");
        let mut find = session("one");
        find.replace_term = "1".to_string();

        find.find_next(&mut buffer).unwrap();
        let next = find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "1 two one");
        assert!(buffer.is_dirty());
        assert_eq!(next, Some((6, 9)));
    }

    #[test]
    fn test_replace_without_matching_selection_only_finds() {
        let mut buffer = DocumentBuffer::with_text("one two one");
        buffer.select(4, 7);
        let mut find = session("one");
        find.replace_term = "1".to_string();

        let next = find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "one two one");
        assert!(!buffer.is_dirty());
        assert_eq!(next, Some((8, 11)));
    }

    #[test]
    fn test_replace_follows_case_rule() {
        let mut buffer = DocumentBuffer::with_text("Word word");
        buffer.select(0, 4);
        let mut find = session("word");
        find.replace_term = "X".to_string();
        find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "X word");

        let mut buffer = DocumentBuffer::with_text("Word word");
        buffer.select(0, 4);
        find.case_sensitive = true;
        find.reset();
        find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "Word word");
    }

    #[test]
    fn test_replace_does_not_rematch_inserted_text() {
        let mut buffer = DocumentBuffer::with_text("a b");
        let mut find = session("a");
        find.replace_term = "aa".to_string();
        find.find_next(&mut buffer).unwrap();
        let next = find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "aa b");
        // Wrapped back to the start: the inserted text is a match again
        assert_eq!(next, Some((0, 1)));
    }

    #[test]
    fn test_replace_regex_expands_groups() {
        let mut buffer = DocumentBuffer::with_text("key=value");
        let mut find = session(r"(\w+)=(\w+)");
        find.use_regex = true;
        find.replace_term = "$2=$1".to_string();
        find.find_next(&mut buffer).unwrap();
        find.replace(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "value=key");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace All
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_all_counts() {
        let mut buffer = DocumentBuffer::with_text("cat dog Cat cat");
        let mut find = session("cat");
        find.replace_term = "cow".to_string();
        assert_eq!(find.replace_all(&mut buffer).unwrap(), 3);
        assert_eq!(buffer.text(), "cow dog cow cow");
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_replace_all_terminates_when_replacement_contains_term() {
        let mut buffer = DocumentBuffer::with_text("a-a-a");
        let mut find = session("a");
        find.replace_term = "aa".to_string();
        assert_eq!(find.replace_all(&mut buffer).unwrap(), 3);
        assert_eq!(buffer.text(), "aa-aa-aa");
    }

    #[test]
    fn test_replace_all_no_match_leaves_clean() {
        let mut buffer = DocumentBuffer::with_text("nothing here");
        let mut find = session("zzz");
        find.replace_term = "y".to_string();
        assert_eq!(find.replace_all(&mut buffer).unwrap(), 0);
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_replace_all_whole_word() {
        let mut buffer = DocumentBuffer::with_text("in inside in");
        let mut find = session("in");
        find.whole_word = true;
        find.replace_term = "out".to_string();
        assert_eq!(find.replace_all(&mut buffer).unwrap(), 2);
        assert_eq!(buffer.text(), "out inside out");
    }
}
