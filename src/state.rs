//! Application state management for Quire
//!
//! This module defines the `TabManager`, which owns the ordered collection
//! of open tabs, the active-tab pointer, the recent-files registry and the
//! user settings. Every document workflow (open, save, save as, save all,
//! close with prompt, exit) is a method here; the UI shell only dispatches
//! commands and renders the resulting state.

use crate::config::{load_config, save_config_silent, save_config_to, Settings};
use crate::editor::{parse_font_size, EditorTab, StatusLine, SyntaxHint};
use crate::error::{Error, Result};
use crate::files::{CloseChoice, Dialogs, RecentFiles};
use log::{debug, info, warn};
use std::env;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether the About window is open
    pub show_about: bool,
    /// Whether the error modal is shown
    pub show_error_modal: bool,
    /// Message displayed in the error modal
    pub error_message: String,
    /// Transient message for the status bar
    pub status_message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of all open documents.
///
/// There is always at least one tab and the active index always refers to
/// a live tab; closing the last tab opens a fresh untitled one.
pub struct TabManager {
    /// All open tabs, in display order
    tabs: Vec<EditorTab>,
    /// Index of the currently active tab
    active_tab_index: usize,
    /// Next tab ID (for unique identification)
    next_tab_id: usize,
    /// Recently opened or saved files
    recent: RecentFiles,
    /// User settings (loaded from config)
    pub settings: Settings,
    /// UI-related state
    pub ui: UiState,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
    /// Explicit settings file; `None` uses the platform config location
    config_path: Option<PathBuf>,
}

impl TabManager {
    /// Create a manager with one empty tab.
    pub fn new(settings: Settings, recent: RecentFiles) -> Self {
        let mut manager = Self {
            tabs: Vec::new(),
            active_tab_index: 0,
            next_tab_id: 0,
            recent,
            settings,
            ui: UiState::default(),
            settings_dirty: false,
            config_path: None,
        };
        manager.new_tab();
        manager
    }

    /// Load settings and the recent-files list, then create the manager.
    pub fn load() -> Self {
        let settings = load_config();
        let recent = RecentFiles::load(settings.recent_files_store(), settings.max_recent_files);
        info!(
            "TabManager initialized ({} recent file(s), theme: {:?})",
            recent.len(),
            settings.theme
        );
        Self::new(settings, recent)
    }

    /// Persist settings to `path` instead of the platform config location.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    pub fn active_tab_index(&self) -> usize {
        self.active_tab_index
    }

    pub fn active_tab(&self) -> Option<&EditorTab> {
        self.tabs.get(self.active_tab_index)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut EditorTab> {
        self.tabs.get_mut(self.active_tab_index)
    }

    pub fn tab(&self, index: usize) -> Option<&EditorTab> {
        self.tabs.get(index)
    }

    /// Find a tab by (absolute) file path.
    pub fn find_tab_by_path(&self, path: &Path) -> Option<usize> {
        self.tabs.iter().position(|t| t.path() == Some(path))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(|t| t.is_dirty())
    }

    /// Status bar data for the active tab.
    pub fn status_line(&self) -> Option<StatusLine> {
        self.active_tab().map(EditorTab::status_line)
    }

    pub fn recent_files(&self) -> &[PathBuf] {
        self.recent.list()
    }

    pub fn clear_recent_files(&mut self) {
        self.recent.clear();
        info!("Cleared recent files");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the active tab by index.
    ///
    /// Returns `true` if the index was valid and the tab was switched.
    pub fn set_active_tab(&mut self, index: usize) -> bool {
        if index < self.tabs.len() {
            self.active_tab_index = index;
            debug!("Switched to tab {}", index);
            true
        } else {
            warn!("Invalid tab index: {}", index);
            false
        }
    }

    pub fn next_tab(&mut self) {
        let index = (self.active_tab_index + 1) % self.tabs.len().max(1);
        self.set_active_tab(index);
    }

    pub fn prev_tab(&mut self) {
        let count = self.tabs.len().max(1);
        let index = (self.active_tab_index + count - 1) % count;
        self.set_active_tab(index);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // New / Open
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an empty untitled tab and activate it.
    ///
    /// Returns the index of the new tab.
    pub fn new_tab(&mut self) -> usize {
        let tab = self.make_tab();
        self.push_tab(tab)
    }

    /// Open `path`, or activate the tab that already shows it.
    ///
    /// On a read error no tab is created. Successful opens are recorded in
    /// the recent-files list.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = absolutize(path.as_ref())?;

        if let Some(index) = self.find_tab_by_path(&path) {
            self.active_tab_index = index;
            info!("File already open, switching to tab {}", index);
            return Ok(index);
        }

        let mut tab = self.make_tab();
        tab.load_from(path.clone())?;
        let index = self.push_tab(tab);
        self.recent.add(path.clone());

        info!("Opened file: {}", path.display());
        Ok(index)
    }

    /// Open an entry of the recent-files list.
    ///
    /// A path that no longer exists is dropped from the list and reported as
    /// [`Error::FileMissing`].
    pub fn open_recent(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            self.recent.remove(path);
            warn!("Recent file no longer exists: {}", path.display());
            return Err(Error::FileMissing {
                path: path.to_path_buf(),
            });
        }
        self.open_file(path)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    pub fn save_active(&mut self, dialogs: &mut dyn Dialogs) -> Result<()> {
        self.save_tab(self.active_tab_index, dialogs)
    }

    pub fn save_as_active(&mut self, dialogs: &mut dyn Dialogs) -> Result<()> {
        self.save_tab_as(self.active_tab_index, dialogs)
    }

    /// Save a tab to its path, asking for one if it has none.
    pub fn save_tab(&mut self, index: usize, dialogs: &mut dyn Dialogs) -> Result<()> {
        let path = self.checked_tab(index)?.path().map(Path::to_path_buf);
        match path {
            Some(path) => self.write_tab(index, path),
            None => self.save_tab_as(index, dialogs),
        }
    }

    /// Ask for a path and save the tab there.
    ///
    /// A cancelled dialog returns [`Error::UserCancelled`] and changes
    /// nothing. A chosen name without an extension gets the configured
    /// default extension. A path already open in another tab is refused
    /// with [`Error::FileAlreadyOpen`].
    pub fn save_tab_as(&mut self, index: usize, dialogs: &mut dyn Dialogs) -> Result<()> {
        let suggested = match self.checked_tab(index)?.path() {
            Some(_) => self.tabs[index].display_name(),
            None => format!("Untitled.{}", self.settings.default_extension),
        };

        let chosen = dialogs.pick_save_path(&suggested).ok_or_else(|| {
            debug!("Save As cancelled");
            Error::UserCancelled
        })?;
        let path = absolutize(&with_default_extension(
            chosen,
            &self.settings.default_extension,
        ))?;
        if self.find_tab_by_path(&path).is_some_and(|other| other != index) {
            warn!("Refusing Save As onto {}, open in another tab", path.display());
            return Err(Error::FileAlreadyOpen { path });
        }
        self.write_tab(index, path)
    }

    /// Save every dirty tab in order, stopping at the first failure or
    /// cancellation. Returns the number of tabs saved.
    pub fn save_all(&mut self, dialogs: &mut dyn Dialogs) -> Result<usize> {
        let previous = self.active_tab_index;
        let mut saved = 0;

        for index in 0..self.tabs.len() {
            if !self.tabs[index].is_dirty() {
                continue;
            }
            self.active_tab_index = index;
            self.save_tab(index, dialogs)?;
            saved += 1;
        }

        self.active_tab_index = previous;
        info!("Saved {} tab(s)", saved);
        Ok(saved)
    }

    fn write_tab(&mut self, index: usize, path: PathBuf) -> Result<()> {
        self.checked_tab(index)?;
        self.tabs[index].save_to(path.clone())?;
        self.recent.add(path);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Close
    // ─────────────────────────────────────────────────────────────────────────

    /// Close a tab, running the close prompt if it has unsaved changes.
    ///
    /// Save runs the save workflow first (a cancelled Save As cancels the
    /// close); Discard closes without saving; Cancel keeps the tab open and
    /// returns [`Error::UserCancelled`].
    pub fn close_tab(&mut self, index: usize, dialogs: &mut dyn Dialogs) -> Result<()> {
        if self.checked_tab(index)?.is_dirty() {
            self.active_tab_index = index;
            self.confirm_discard_or_save(index, dialogs)?;
        }
        self.remove_tab(index);
        Ok(())
    }

    pub fn close_active(&mut self, dialogs: &mut dyn Dialogs) -> Result<()> {
        self.close_tab(self.active_tab_index, dialogs)
    }

    /// Close every tab except `keep`, last to first.
    pub fn close_others(&mut self, keep: usize, dialogs: &mut dyn Dialogs) -> Result<()> {
        let keep_id = self.checked_tab(keep)?.id();

        for index in (0..self.tabs.len()).rev() {
            if self.tabs[index].id() != keep_id {
                self.close_tab(index, dialogs)?;
            }
        }

        if let Some(index) = self.tabs.iter().position(|t| t.id() == keep_id) {
            self.active_tab_index = index;
        }
        Ok(())
    }

    /// Close every tab, last to first. Stops at the first cancelled prompt.
    pub fn close_all(&mut self, dialogs: &mut dyn Dialogs) -> Result<()> {
        for index in (0..self.tabs.len()).rev() {
            self.close_tab(index, dialogs)?;
        }
        Ok(())
    }

    /// Remove a tab without prompting.
    ///
    /// Returns `true` if the tab existed and was closed.
    pub fn remove_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }

        self.tabs.remove(index);

        if self.tabs.is_empty() {
            self.new_tab();
        } else if self.active_tab_index >= self.tabs.len() {
            self.active_tab_index = self.tabs.len() - 1;
        } else if index < self.active_tab_index {
            self.active_tab_index -= 1;
        }

        debug!(
            "Closed tab {}, active is now {}",
            index, self.active_tab_index
        );
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exit
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the close prompt for every dirty tab in order, then shut down.
    ///
    /// Returns [`Error::UserCancelled`] (or the save error) if the exit must
    /// not proceed; tabs handled before that point keep their state.
    pub fn request_exit(&mut self, dialogs: &mut dyn Dialogs) -> Result<()> {
        for index in 0..self.tabs.len() {
            if self.tabs[index].is_dirty() {
                self.active_tab_index = index;
                self.confirm_discard_or_save(index, dialogs)?;
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Persist the recent-files list and settings.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.recent.save() {
            warn!("Failed to save recent files during shutdown: {}", e);
        }
        self.save_settings();
        info!("Shutdown complete");
    }

    fn confirm_discard_or_save(&mut self, index: usize, dialogs: &mut dyn Dialogs) -> Result<()> {
        let name = self.tabs[index].display_name();
        match dialogs.confirm_close(&name) {
            CloseChoice::Save => self.save_tab(index, dialogs),
            CloseChoice::Discard => {
                debug!("Discarding changes to {}", name);
                Ok(())
            }
            CloseChoice::Cancel => Err(Error::UserCancelled),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // View Commands
    // ─────────────────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            tab.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            tab.zoom_out();
        }
    }

    /// Return the active tab to the configured font size.
    pub fn reset_zoom(&mut self) {
        let size = self.settings.font_size;
        if let Some(tab) = self.active_tab_mut() {
            tab.reset_zoom(size);
        }
    }

    pub fn toggle_word_wrap(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            let wrap = !tab.word_wrap();
            tab.set_word_wrap(wrap);
        }
    }

    pub fn set_syntax(&mut self, hint: Option<SyntaxHint>) {
        if let Some(tab) = self.active_tab_mut() {
            tab.set_syntax_highlighting(hint);
        }
    }

    /// Set the active tab's font from a family name and typed size.
    ///
    /// An unparseable size leaves the font unchanged.
    pub fn set_font(&mut self, family: &str, size_text: &str) -> Result<()> {
        let size = parse_font_size(size_text)?;
        if let Some(tab) = self.active_tab_mut() {
            tab.set_font(family, size);
        }
        Ok(())
    }

    pub fn toggle_theme(&mut self) {
        self.settings.theme = self.settings.theme.toggle();
        self.settings_dirty = true;
        info!("Theme set to {}", self.settings.theme.label());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark settings as dirty (needing to be saved).
    pub fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    pub fn settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    /// Save settings to the config file.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings(&mut self) -> bool {
        let saved = match &self.config_path {
            Some(path) => match save_config_to(&self.settings, path) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to save configuration: {}", e);
                    false
                }
            },
            None => save_config_silent(&self.settings),
        };
        if saved {
            self.settings_dirty = false;
        }
        saved
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI State Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.ui.status_message = None;
    }

    pub fn toggle_about(&mut self) {
        self.ui.show_about = !self.ui.show_about;
    }

    /// Show an error in a modal dialog.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.ui.error_message = message.into();
        self.ui.show_error_modal = true;
    }

    pub fn dismiss_error(&mut self) {
        self.ui.show_error_modal = false;
        self.ui.error_message.clear();
    }

    /// Report the outcome of a workflow: errors go to the modal,
    /// cancellation is silent.
    pub fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => {
                debug!("Operation cancelled by user");
                None
            }
            Err(e) => {
                warn!("{}", e);
                self.show_error(e.to_string());
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn make_tab(&self) -> EditorTab {
        EditorTab::new(self.next_tab_id).with_style(
            &self.settings.font_family,
            self.settings.font_size,
            self.settings.word_wrap,
        )
    }

    fn push_tab(&mut self, tab: EditorTab) -> usize {
        self.next_tab_id = self.next_tab_id.max(tab.id()) + 1;
        self.tabs.push(tab);
        self.active_tab_index = self.tabs.len() - 1;
        debug!("Created tab at index {}", self.active_tab_index);
        self.active_tab_index
    }

    fn checked_tab(&self, index: usize) -> Result<&EditorTab> {
        self.tabs
            .get(index)
            .ok_or_else(|| Error::Application(format!("Invalid tab index: {}", index)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Path Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve a relative path against the working directory.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Append `.extension` when the file name contains no dot.
fn with_default_extension(mut path: PathBuf, extension: &str) -> PathBuf {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return path,
    };
    if !name.contains('.') {
        path.set_file_name(format!("{}.{}", name, extension));
    }
    path
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::files::{MAX_RECENT_FILES, RECENT_FILES_NAME};
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    /// Dialogs answering from a script, recording every close prompt.
    #[derive(Default)]
    struct ScriptedDialogs {
        save_paths: VecDeque<Option<PathBuf>>,
        choices: VecDeque<CloseChoice>,
        prompts: Vec<String>,
        save_requests: usize,
    }

    impl ScriptedDialogs {
        fn new() -> Self {
            Self::default()
        }

        fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
            self.save_paths.push_back(Some(path.into()));
            self
        }

        fn cancel_save(mut self) -> Self {
            self.save_paths.push_back(None);
            self
        }

        fn choose(mut self, choice: CloseChoice) -> Self {
            self.choices.push_back(choice);
            self
        }
    }

    impl Dialogs for ScriptedDialogs {
        fn pick_save_path(&mut self, _suggested_name: &str) -> Option<PathBuf> {
            self.save_requests += 1;
            self.save_paths.pop_front().flatten()
        }

        fn confirm_close(&mut self, document_name: &str) -> CloseChoice {
            self.prompts.push(document_name.to_string());
            self.choices.pop_front().unwrap_or(CloseChoice::Cancel)
        }
    }

    fn manager(dir: &TempDir) -> TabManager {
        let recent = RecentFiles::empty(dir.path().join(RECENT_FILES_NAME), MAX_RECENT_FILES);
        TabManager::new(Settings::default(), recent)
            .with_config_path(dir.path().join("config").join("config.json"))
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn type_text(manager: &mut TabManager, text: &str) {
        manager.active_tab_mut().unwrap().buffer.insert(text);
    }

    /// Documents in `dir`, ignoring the recent-files side file and config.
    fn documents_in(dir: &TempDir) -> Vec<PathBuf> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.is_file() && p.file_name().unwrap() != RECENT_FILES_NAME)
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // New / Open
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_starts_with_one_clean_untitled_tab() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        assert_eq!(manager.tab_count(), 1);
        let tab = manager.active_tab().unwrap();
        assert!(tab.path().is_none());
        assert!(!tab.is_dirty());
        assert!(tab.buffer.is_empty());
    }

    #[test]
    fn test_new_tab_appends_and_activates() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let index = manager.new_tab();
        assert_eq!(index, 1);
        assert_eq!(manager.active_tab_index(), 1);
        assert_ne!(manager.tabs()[0].id(), manager.tabs()[1].id());
    }

    #[test]
    fn test_new_tab_uses_settings_style() {
        let dir = TempDir::new().unwrap();
        let recent = RecentFiles::empty(dir.path().join(RECENT_FILES_NAME), MAX_RECENT_FILES);
        let settings = Settings {
            font_family: "Serif".to_string(),
            font_size: 15.0,
            word_wrap: true,
            ..Settings::default()
        };
        let manager = TabManager::new(settings, recent);
        let tab = manager.active_tab().unwrap();
        assert_eq!(tab.font_name(), "Serif");
        assert_eq!(tab.font_size(), 15.0);
        assert!(tab.word_wrap());
    }

    #[test]
    fn test_open_file_twice_never_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "notes.txt", "content");

        let first = manager.open_file(&path).unwrap();
        manager.set_active_tab(0);
        let second = manager.open_file(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.active_tab_index(), first);
        assert_eq!(manager.tab_count(), 2);
        assert_eq!(manager.recent_files(), &[path.clone()]);

        let tab = manager.active_tab().unwrap();
        assert_eq!(tab.buffer.text(), "content");
        assert!(!tab.is_dirty());
    }

    #[test]
    fn test_open_file_infers_syntax_hint() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "page.html", "<p>hi</p>");
        manager.open_file(&path).unwrap();
        assert_eq!(manager.active_tab().unwrap().syntax(), Some(SyntaxHint::Xml));
    }

    #[test]
    fn test_open_unreadable_file_creates_no_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let err = manager.open_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert_eq!(manager.tab_count(), 1);
        assert!(manager.recent_files().is_empty());
    }

    #[test]
    fn test_open_recent_missing_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "gone.txt", "x");
        manager.open_file(&path).unwrap();
        manager.remove_tab(1);
        fs::remove_file(&path).unwrap();

        let err = manager.open_recent(&path).unwrap_err();
        assert!(matches!(err, Error::FileMissing { .. }));
        assert!(manager.recent_files().is_empty());
        assert_eq!(manager.tab_count(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dirty Tracking & Save
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_dirty_until_successful_save() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let target = dir.path().join("draft.txt");
        let mut dialogs = ScriptedDialogs::new().save_to(&target);

        type_text(&mut manager, "a");
        assert!(manager.active_tab().unwrap().is_dirty());
        type_text(&mut manager, "b");
        assert!(manager.active_tab().unwrap().is_dirty());

        manager.save_active(&mut dialogs).unwrap();
        let tab = manager.active_tab().unwrap();
        assert!(!tab.is_dirty());
        assert_eq!(tab.path(), Some(target.as_path()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "ab");
        assert_eq!(manager.recent_files(), &[target.clone()]);

        // Second save reuses the path without asking
        type_text(&mut manager, "c");
        manager.save_active(&mut dialogs).unwrap();
        assert_eq!(dialogs.save_requests, 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), "abc");
    }

    #[test]
    fn test_save_as_appends_default_extension() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let mut dialogs = ScriptedDialogs::new().save_to(dir.path().join("report"));

        type_text(&mut manager, "body");
        manager.save_as_active(&mut dialogs).unwrap();

        let expected = dir.path().join("report.txt");
        assert_eq!(fs::read_to_string(&expected).unwrap(), "body");
        assert_eq!(manager.active_tab().unwrap().path(), Some(expected.as_path()));
    }

    #[test]
    fn test_save_as_keeps_explicit_extension() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let mut dialogs = ScriptedDialogs::new().save_to(dir.path().join("Main.java"));

        type_text(&mut manager, "class Main {}");
        manager.save_as_active(&mut dialogs).unwrap();
        assert!(dir.path().join("Main.java").exists());
    }

    #[test]
    fn test_save_as_onto_path_open_in_other_tab_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "shared.txt", "original");
        manager.open_file(&path).unwrap();

        manager.new_tab();
        type_text(&mut manager, "other");
        let mut dialogs = ScriptedDialogs::new().save_to(&path);
        let err = manager.save_as_active(&mut dialogs).unwrap_err();
        assert!(matches!(err, Error::FileAlreadyOpen { .. }));

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        let tab = manager.active_tab().unwrap();
        assert!(tab.is_dirty());
        assert!(tab.path().is_none());
        assert_eq!(
            manager.tabs().iter().filter(|t| t.path() == Some(path.as_path())).count(),
            1
        );
    }

    #[test]
    fn test_save_as_onto_own_path_is_allowed() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "own.txt", "old");
        manager.open_file(&path).unwrap();
        type_text(&mut manager, "new ");

        let mut dialogs = ScriptedDialogs::new().save_to(&path);
        manager.save_as_active(&mut dialogs).unwrap();
        assert!(!manager.active_tab().unwrap().is_dirty());
    }

    #[test]
    fn test_save_as_cancelled_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let mut dialogs = ScriptedDialogs::new().cancel_save();

        type_text(&mut manager, "keep");
        let err = manager.save_as_active(&mut dialogs).unwrap_err();
        assert!(err.is_cancelled());

        let tab = manager.active_tab().unwrap();
        assert!(tab.is_dirty());
        assert!(tab.path().is_none());
        assert!(documents_in(&dir).is_empty());
    }

    #[test]
    fn test_save_failure_keeps_dirty_and_path() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let bad = dir.path().join("no-such-dir").join("out.txt");
        let mut dialogs = ScriptedDialogs::new().save_to(bad);

        type_text(&mut manager, "text");
        let err = manager.save_active(&mut dialogs).unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));

        let tab = manager.active_tab().unwrap();
        assert!(tab.is_dirty());
        assert!(tab.path().is_none());
        assert!(manager.recent_files().is_empty());
    }

    #[test]
    fn test_save_all_stops_at_cancelled_save_as() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let a = write_file(&dir, "a.txt", "a");
        let b = write_file(&dir, "b.txt", "b");

        manager.open_file(&a).unwrap();
        type_text(&mut manager, "1");
        manager.new_tab();
        type_text(&mut manager, "untitled");
        manager.open_file(&b).unwrap();
        type_text(&mut manager, "2");

        let mut dialogs = ScriptedDialogs::new().cancel_save();
        let err = manager.save_all(&mut dialogs).unwrap_err();
        assert!(err.is_cancelled());

        assert!(!manager.tab(1).unwrap().is_dirty());
        assert!(manager.tab(2).unwrap().is_dirty());
        assert!(manager.tab(3).unwrap().is_dirty());
        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn test_save_all_saves_every_dirty_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let a = write_file(&dir, "a.txt", "");
        let b = write_file(&dir, "b.txt", "");
        manager.open_file(&a).unwrap();
        type_text(&mut manager, "A");
        manager.open_file(&b).unwrap();
        type_text(&mut manager, "B");
        manager.set_active_tab(1);

        let saved = manager.save_all(&mut ScriptedDialogs::new()).unwrap();
        assert_eq!(saved, 2);
        assert!(!manager.has_unsaved_changes());
        assert_eq!(manager.active_tab_index(), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), "A");
        assert_eq!(fs::read_to_string(&b).unwrap(), "B");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Close Prompt Protocol
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_close_clean_tab_does_not_prompt() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        let mut dialogs = ScriptedDialogs::new();
        manager.close_active(&mut dialogs).unwrap();
        assert!(dialogs.prompts.is_empty());
        assert_eq!(manager.tab_count(), 1);
    }

    #[test]
    fn test_close_last_tab_opens_fresh_one() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "scratch");
        let old_id = manager.active_tab().unwrap().id();

        let mut dialogs = ScriptedDialogs::new().choose(CloseChoice::Discard);
        manager.close_active(&mut dialogs).unwrap();

        assert_eq!(manager.tab_count(), 1);
        let tab = manager.active_tab().unwrap();
        assert_ne!(tab.id(), old_id);
        assert!(!tab.is_dirty());
        assert!(tab.buffer.is_empty());
    }

    #[test]
    fn test_close_cancel_keeps_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "work");

        let mut dialogs = ScriptedDialogs::new().choose(CloseChoice::Cancel);
        let err = manager.close_active(&mut dialogs).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(dialogs.prompts, vec!["Untitled".to_string()]);
        assert!(manager.active_tab().unwrap().is_dirty());
    }

    #[test]
    fn test_close_save_with_cancelled_dialog_keeps_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "unsaved content");

        let mut dialogs = ScriptedDialogs::new()
            .choose(CloseChoice::Save)
            .cancel_save();
        let err = manager.close_active(&mut dialogs).unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(manager.tab_count(), 1);
        let tab = manager.active_tab().unwrap();
        assert!(tab.is_dirty());
        assert_eq!(tab.buffer.text(), "unsaved content");
        assert!(documents_in(&dir).is_empty());
    }

    #[test]
    fn test_close_save_writes_then_closes() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        type_text(&mut manager, "keep this");
        let target = dir.path().join("kept.txt");

        let mut dialogs = ScriptedDialogs::new()
            .choose(CloseChoice::Save)
            .save_to(&target);
        manager.close_active(&mut dialogs).unwrap();

        assert_eq!(manager.tab_count(), 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep this");
        assert_eq!(manager.recent_files(), &[target]);
    }

    #[test]
    fn test_close_all_stops_at_cancelled_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "one");
        manager.new_tab();
        type_text(&mut manager, "two");
        manager.new_tab();
        type_text(&mut manager, "three");
        let ids: Vec<usize> = manager.tabs().iter().map(EditorTab::id).collect();

        // Prompted last to first: the first prompted tab is discarded,
        // the second cancels.
        let mut dialogs = ScriptedDialogs::new()
            .choose(CloseChoice::Discard)
            .choose(CloseChoice::Cancel);
        let err = manager.close_all(&mut dialogs).unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(dialogs.prompts.len(), 2);
        let remaining: Vec<usize> = manager.tabs().iter().map(EditorTab::id).collect();
        assert_eq!(remaining, vec![ids[0], ids[1]]);
        assert!(manager.tabs().iter().all(EditorTab::is_dirty));
    }

    #[test]
    fn test_close_all_leaves_one_fresh_tab() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "one");
        manager.new_tab();
        manager.new_tab();
        type_text(&mut manager, "three");

        let mut dialogs = ScriptedDialogs::new()
            .choose(CloseChoice::Discard)
            .choose(CloseChoice::Discard);
        manager.close_all(&mut dialogs).unwrap();

        assert_eq!(dialogs.prompts.len(), 2);
        assert_eq!(manager.tab_count(), 1);
        assert!(!manager.has_unsaved_changes());
    }

    #[test]
    fn test_close_others_keeps_and_activates() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        type_text(&mut manager, "kept");
        let keep_id = manager.active_tab().unwrap().id();
        manager.new_tab();
        manager.new_tab();

        manager.close_others(1, &mut ScriptedDialogs::new()).unwrap();
        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.active_tab().unwrap().id(), keep_id);
        assert_eq!(manager.active_tab().unwrap().buffer.text(), "kept");
    }

    #[test]
    fn test_close_others_cancel_stops() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        type_text(&mut manager, "dirty first");
        manager.new_tab();
        manager.new_tab();

        let err = manager
            .close_others(1, &mut ScriptedDialogs::new().choose(CloseChoice::Cancel))
            .unwrap_err();
        assert!(err.is_cancelled());
        // Clean tab 2 closed silently; dirty tab 0 stayed
        assert_eq!(manager.tab_count(), 2);
    }

    #[test]
    fn test_remove_tab_adjusts_active_index() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        manager.new_tab();
        manager.set_active_tab(2);

        assert!(manager.remove_tab(0));
        assert_eq!(manager.active_tab_index(), 1);
        assert!(manager.remove_tab(1));
        assert_eq!(manager.active_tab_index(), 0);
        assert!(!manager.remove_tab(5));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exit
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_exit_cancel_keeps_everything() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        type_text(&mut manager, "unsaved");

        let err = manager
            .request_exit(&mut ScriptedDialogs::new().choose(CloseChoice::Cancel))
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(manager.tab_count(), 2);
        assert_eq!(manager.active_tab_index(), 1);
        assert!(manager.has_unsaved_changes());
    }

    #[test]
    fn test_exit_persists_recent_files_and_settings() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "doc.txt", "x");
        manager.open_file(&path).unwrap();
        type_text(&mut manager, "y");
        manager.toggle_theme();

        manager
            .request_exit(&mut ScriptedDialogs::new().choose(CloseChoice::Discard))
            .unwrap();

        let recent = RecentFiles::load(dir.path().join(RECENT_FILES_NAME), MAX_RECENT_FILES);
        assert_eq!(recent.list(), &[path]);
        assert!(!manager.settings_dirty());
        let saved = crate::config::load_config_from(&dir.path().join("config").join("config.json"))
            .unwrap();
        assert_eq!(saved.theme, Theme::Dark);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // View Commands
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_zoom_and_reset() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.zoom_in();
        manager.zoom_in();
        assert_eq!(manager.active_tab().unwrap().font_size(), 14.0);
        manager.zoom_out();
        assert_eq!(manager.active_tab().unwrap().font_size(), 13.0);
        manager.reset_zoom();
        assert_eq!(manager.active_tab().unwrap().font_size(), 12.0);
    }

    #[test]
    fn test_set_font_rejects_bad_size() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.set_font("Serif", "18").unwrap();
        assert_eq!(manager.active_tab().unwrap().font_size(), 18.0);

        let err = manager.set_font("Sans", "huge").unwrap_err();
        assert!(matches!(err, Error::InvalidFontSize(_)));
        let tab = manager.active_tab().unwrap();
        assert_eq!(tab.font_name(), "Serif");
        assert_eq!(tab.font_size(), 18.0);
    }

    #[test]
    fn test_toggle_word_wrap_keeps_clean() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.toggle_word_wrap();
        assert!(manager.active_tab().unwrap().word_wrap());
        assert!(!manager.has_unsaved_changes());
    }

    #[test]
    fn test_next_prev_tab_wraps() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager.new_tab();
        manager.new_tab();
        manager.next_tab();
        assert_eq!(manager.active_tab_index(), 0);
        manager.prev_tab();
        assert_eq!(manager.active_tab_index(), 2);
    }

    #[test]
    fn test_status_line_for_saved_file() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let path = write_file(&dir, "Main.java", "class A {}\n");
        manager.open_file(&path).unwrap();
        let status = manager.status_line().unwrap();
        assert_eq!(status.file, path.display().to_string());
        assert_eq!(status.font_name, "Monospaced");
        assert_eq!((status.line, status.column), (1, 1));
    }

    #[test]
    fn test_report_hides_cancellation() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        assert!(manager.report::<()>(Err(Error::UserCancelled)).is_none());
        assert!(!manager.ui.show_error_modal);

        manager.report::<()>(Err(Error::Application("boom".to_string())));
        assert!(manager.ui.show_error_modal);
        assert_eq!(manager.ui.error_message, "boom");
    }

    #[test]
    fn test_with_default_extension() {
        assert_eq!(
            with_default_extension(PathBuf::from("/a/notes"), "txt"),
            PathBuf::from("/a/notes.txt")
        );
        assert_eq!(
            with_default_extension(PathBuf::from("/a/notes.md"), "txt"),
            PathBuf::from("/a/notes.md")
        );
    }
}
