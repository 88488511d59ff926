//! Main application module for Quire
//!
//! This module contains the `QuireApp` struct which implements the eframe App
//! trait. Menus, the toolbar and keyboard shortcuts all produce a `Command`;
//! commands are dispatched to the `TabManager` after the frame is laid out.

use crate::clipboard::SystemClipboard;
use crate::config::Theme;
use crate::editor::{
    EditorWidget, FindMode, FindReplacePanel, FindSession, SyntaxHint, MONOSPACED_FONT,
};
use crate::files::NativeDialogs;
use crate::state::TabManager;
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Window title suffix and About heading.
pub const APP_NAME: &str = "Quire";

/// Font families offered by the toolbar.
const FONT_FAMILIES: &[&str] = &[MONOSPACED_FONT, "Serif", "SansSerif"];

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// A user action from a menu, toolbar button, tab strip or shortcut.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    // File
    New,
    Open,
    OpenRecent(PathBuf),
    ClearRecent,
    Save,
    SaveAs,
    SaveAll,
    Close,
    CloseTab(usize),
    CloseOthers(usize),
    CloseAll,
    Exit,
    // Edit
    Cut,
    Copy,
    Paste,
    SelectAll,
    Find,
    Replace,
    FindNext,
    // View / Format
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ToggleWordWrap,
    ToggleTheme,
    SetSyntax(Option<SyntaxHint>),
    ApplyFont,
    // Navigation
    ActivateTab(usize),
    NextTab,
    PrevTab,
    // Help
    About,
}

/// Action requested from the find window.
#[derive(Debug, Clone, Copy)]
enum FindAction {
    Next,
    Replace,
    ReplaceAll,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// The main application struct.
pub struct QuireApp {
    /// Tabs, recent files and settings
    manager: TabManager,
    /// Native file and message dialogs
    dialogs: NativeDialogs,
    /// Backing store for the Edit menu's cut/copy/paste
    clipboard: SystemClipboard,
    /// Open find/replace session, if the find window is shown
    find: Option<FindSession>,
    find_panel: FindReplacePanel,
    /// Toolbar font family selection
    font_family_input: String,
    /// Toolbar font size text
    font_size_input: String,
    /// Tab id, family and size the toolbar inputs were last filled from
    font_inputs_source: Option<(usize, String, f32)>,
    /// Theme whose visuals are currently installed
    applied_theme: Option<Theme>,
    /// Title last sent to the window
    window_title: String,
    /// Set once the exit protocol has completed
    should_exit: bool,
    /// Last observed inner window size
    last_window_size: Option<egui::Vec2>,
}

impl QuireApp {
    /// Create the application, loading settings and recent files.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let manager = TabManager::load();

        // Ctrl+Plus/Minus/0 zoom the document, not the whole UI
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);

        info!("Quire initialized");
        Self {
            manager,
            dialogs: NativeDialogs::new(),
            clipboard: SystemClipboard::new(),
            find: None,
            find_panel: FindReplacePanel::new(),
            font_family_input: String::new(),
            font_size_input: String::new(),
            font_inputs_source: None,
            applied_theme: None,
            window_title: String::new(),
            should_exit: false,
            last_window_size: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame Housekeeping
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let theme = self.manager.settings.theme;
        if self.applied_theme != Some(theme) {
            let visuals = if theme.is_dark() {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
            ctx.set_visuals(visuals);
            self.applied_theme = Some(theme);
            debug!("Applied {} theme", theme.label());
        }
    }

    /// Refill the toolbar font inputs when the active tab or its font changes.
    fn refresh_font_inputs(&mut self) {
        let Some(tab) = self.manager.active_tab() else {
            return;
        };
        let source = (tab.id(), tab.font_name().to_string(), tab.font_size());
        if self.font_inputs_source.as_ref() != Some(&source) {
            self.font_family_input = source.1.clone();
            self.font_size_input = format!("{}", source.2);
            self.font_inputs_source = Some(source);
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let title = match self.manager.active_tab() {
            Some(tab) => format!("{} - {}", tab.title(), APP_NAME),
            None => APP_NAME.to_string(),
        };
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    /// Track window size changes so they are persisted on exit.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (inner_rect, maximized) =
            ctx.input(|i| (i.viewport().inner_rect, i.viewport().maximized));

        if let Some(maximized) = maximized {
            if maximized != self.manager.settings.window_size.maximized {
                self.manager.settings.window_size.maximized = maximized;
                self.manager.mark_settings_dirty();
            }
            if maximized {
                return;
            }
        }

        if let Some(rect) = inner_rect {
            let size = rect.size();
            if self.last_window_size != Some(size) {
                self.last_window_size = Some(size);
                self.manager.settings.window_size.width = size.x;
                self.manager.settings.window_size.height = size.y;
                self.manager.mark_settings_dirty();
            }
        }
    }

    /// Route an OS close request through the close-prompt protocol.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.should_exit {
            return;
        }
        self.handle_exit();
        if !self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
    }

    fn handle_exit(&mut self) {
        let result = self.manager.request_exit(&mut self.dialogs);
        if self.manager.report(result).is_some() {
            info!("Exit confirmed");
            self.should_exit = true;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard Shortcuts
    // ─────────────────────────────────────────────────────────────────────────

    /// Detect the shortcut pressed this frame, if any.
    ///
    /// Cut, copy, paste and select all are left to the focused text edit,
    /// and F3 to the find window.
    fn detect_shortcut(&self, ctx: &egui::Context) -> Option<Command> {
        ctx.input(|i| {
            let ctrl = i.modifiers.ctrl;
            let shift = i.modifiers.shift;
            let alt = i.modifiers.alt;

            if ctrl && alt && i.key_pressed(egui::Key::S) {
                Some(Command::SaveAll)
            } else if ctrl && shift && i.key_pressed(egui::Key::S) {
                Some(Command::SaveAs)
            } else if ctrl && i.key_pressed(egui::Key::S) {
                Some(Command::Save)
            } else if ctrl && shift && i.key_pressed(egui::Key::T) {
                Some(Command::ToggleTheme)
            } else if ctrl && i.key_pressed(egui::Key::N) {
                Some(Command::New)
            } else if ctrl && i.key_pressed(egui::Key::O) {
                Some(Command::Open)
            } else if ctrl && i.key_pressed(egui::Key::W) {
                Some(Command::Close)
            } else if ctrl && i.key_pressed(egui::Key::F) {
                Some(Command::Find)
            } else if ctrl && i.key_pressed(egui::Key::H) {
                Some(Command::Replace)
            } else if ctrl && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals))
            {
                Some(Command::ZoomIn)
            } else if ctrl && i.key_pressed(egui::Key::Minus) {
                Some(Command::ZoomOut)
            } else if ctrl && i.key_pressed(egui::Key::Num0) {
                Some(Command::ResetZoom)
            } else if ctrl && shift && i.key_pressed(egui::Key::Tab) {
                Some(Command::PrevTab)
            } else if ctrl && i.key_pressed(egui::Key::Tab) {
                Some(Command::NextTab)
            } else {
                None
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    fn dispatch(&mut self, command: Command) {
        debug!("Command: {:?}", command);
        match command {
            Command::New => {
                self.manager.new_tab();
            }
            Command::Open => self.handle_open(),
            Command::OpenRecent(path) => {
                let result = self.manager.open_recent(&path);
                self.manager.report(result);
            }
            Command::ClearRecent => self.manager.clear_recent_files(),
            Command::Save => {
                let result = self.manager.save_active(&mut self.dialogs);
                self.manager.report(result);
            }
            Command::SaveAs => {
                let result = self.manager.save_as_active(&mut self.dialogs);
                self.manager.report(result);
            }
            Command::SaveAll => {
                let result = self.manager.save_all(&mut self.dialogs);
                if let Some(count) = self.manager.report(result) {
                    self.manager.set_status(format!("Saved {} file(s)", count));
                }
            }
            Command::Close => {
                let result = self.manager.close_active(&mut self.dialogs);
                self.manager.report(result);
            }
            Command::CloseTab(index) => {
                let result = self.manager.close_tab(index, &mut self.dialogs);
                self.manager.report(result);
            }
            Command::CloseOthers(index) => {
                let result = self.manager.close_others(index, &mut self.dialogs);
                self.manager.report(result);
            }
            Command::CloseAll => {
                let result = self.manager.close_all(&mut self.dialogs);
                self.manager.report(result);
            }
            Command::Exit => self.handle_exit(),

            Command::Cut => {
                if let Some(tab) = self.manager.active_tab_mut() {
                    let result = tab.cut(&mut self.clipboard);
                    self.manager.report(result);
                }
            }
            Command::Copy => {
                if let Some(tab) = self.manager.active_tab() {
                    let result = tab.copy(&mut self.clipboard);
                    self.manager.report(result);
                }
            }
            Command::Paste => {
                if let Some(tab) = self.manager.active_tab_mut() {
                    tab.paste(&mut self.clipboard);
                }
            }
            Command::SelectAll => {
                if let Some(tab) = self.manager.active_tab_mut() {
                    tab.select_all();
                }
            }
            Command::Find => self.open_find(FindMode::Find),
            Command::Replace => self.open_find(FindMode::Replace),
            Command::FindNext => self.run_find(FindAction::Next),

            Command::ZoomIn => self.manager.zoom_in(),
            Command::ZoomOut => self.manager.zoom_out(),
            Command::ResetZoom => self.manager.reset_zoom(),
            Command::ToggleWordWrap => self.manager.toggle_word_wrap(),
            Command::ToggleTheme => {
                self.manager.toggle_theme();
                self.manager.save_settings();
            }
            Command::SetSyntax(hint) => self.manager.set_syntax(hint),
            Command::ApplyFont => {
                let result = self
                    .manager
                    .set_font(&self.font_family_input, &self.font_size_input);
                if self.manager.report(result).is_none() {
                    // Restore the inputs from the unchanged tab
                    self.font_inputs_source = None;
                }
            }

            Command::ActivateTab(index) => {
                self.manager.set_active_tab(index);
            }
            Command::NextTab => self.manager.next_tab(),
            Command::PrevTab => self.manager.prev_tab(),

            Command::About => self.manager.toggle_about(),
        }
    }

    fn handle_open(&mut self) {
        let paths = self.dialogs.pick_open_paths();
        if paths.is_empty() {
            debug!("Open dialog cancelled");
            return;
        }
        for path in paths {
            let result = self.manager.open_file(&path);
            self.manager.report(result);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find / Replace
    // ─────────────────────────────────────────────────────────────────────────

    /// Show the find window, seeding the term from a single-line selection.
    fn open_find(&mut self, mode: FindMode) {
        let session = self.find.get_or_insert_with(|| FindSession::new(mode));
        session.mode = mode;

        if let Some(selected) = self
            .manager
            .active_tab()
            .and_then(|tab| tab.buffer.selected_text())
        {
            if !selected.is_empty() && !selected.contains('\n') {
                session.search_term = selected.to_string();
                session.reset();
            }
        }

        self.find_panel.set_message("");
        self.find_panel.request_focus();
    }

    fn run_find(&mut self, action: FindAction) {
        let Some(session) = self.find.as_mut() else {
            return;
        };
        let Some(tab) = self.manager.active_tab_mut() else {
            return;
        };
        session.attach(tab.id());

        let message = match action {
            FindAction::Next => match session.find_next(&mut tab.buffer) {
                Ok(Some(_)) => String::new(),
                Ok(None) => format!("\"{}\" not found", session.search_term),
                Err(e) => e.to_string(),
            },
            FindAction::Replace => match session.replace(&mut tab.buffer) {
                Ok(Some(_)) => String::new(),
                Ok(None) => format!("\"{}\" not found", session.search_term),
                Err(e) => e.to_string(),
            },
            FindAction::ReplaceAll => match session.replace_all(&mut tab.buffer) {
                Ok(count) => format!("Replaced {} occurrence(s)", count),
                Err(e) => e.to_string(),
            },
        };
        self.find_panel.set_message(message);
    }

    fn render_find_panel(&mut self, ctx: &egui::Context) {
        let is_dark = self.manager.settings.theme.is_dark();
        let Some(session) = self.find.as_mut() else {
            return;
        };

        let output = self.find_panel.show(ctx, session, is_dark);

        if output.search_changed {
            session.reset();
            self.find_panel.set_message("");
        }
        if output.close_requested {
            debug!("Find window closed");
            self.find = None;
            return;
        }
        if output.next_requested {
            self.run_find(FindAction::Next);
        }
        if output.replace_requested {
            self.run_find(FindAction::Replace);
        }
        if output.replace_all_requested {
            self.run_find(FindAction::ReplaceAll);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Menus and Toolbar
    // ─────────────────────────────────────────────────────────────────────────

    fn render_menu_bar(&self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                menu_item(ui, "New", "Ctrl+N", Command::New, commands);
                menu_item(ui, "Open...", "Ctrl+O", Command::Open, commands);
                ui.menu_button("Open Recent", |ui| self.recent_files_menu(ui, commands));
                ui.separator();
                menu_item(ui, "Save", "Ctrl+S", Command::Save, commands);
                menu_item(ui, "Save As...", "Ctrl+Shift+S", Command::SaveAs, commands);
                menu_item(ui, "Save All", "Ctrl+Alt+S", Command::SaveAll, commands);
                ui.separator();
                menu_item(ui, "Close", "Ctrl+W", Command::Close, commands);
                let active = self.manager.active_tab_index();
                menu_item(ui, "Close Others", "", Command::CloseOthers(active), commands);
                menu_item(ui, "Close All", "", Command::CloseAll, commands);
                ui.separator();
                menu_item(ui, "Exit", "", Command::Exit, commands);
            });

            ui.menu_button("Edit", |ui| {
                menu_item(ui, "Cut", "Ctrl+X", Command::Cut, commands);
                menu_item(ui, "Copy", "Ctrl+C", Command::Copy, commands);
                menu_item(ui, "Paste", "Ctrl+V", Command::Paste, commands);
                menu_item(ui, "Select All", "Ctrl+A", Command::SelectAll, commands);
                ui.separator();
                menu_item(ui, "Find...", "Ctrl+F", Command::Find, commands);
                menu_item(ui, "Replace...", "Ctrl+H", Command::Replace, commands);
                let find_open = self.find.is_some();
                if ui
                    .add_enabled(
                        find_open,
                        egui::Button::new("Find Next").shortcut_text("F3"),
                    )
                    .clicked()
                {
                    commands.push(Command::FindNext);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                menu_item(ui, "Zoom In", "Ctrl++", Command::ZoomIn, commands);
                menu_item(ui, "Zoom Out", "Ctrl+-", Command::ZoomOut, commands);
                menu_item(ui, "Reset Zoom", "Ctrl+0", Command::ResetZoom, commands);
                ui.separator();
                let theme_label = if self.manager.settings.theme.is_dark() {
                    "Light Theme"
                } else {
                    "Dark Theme"
                };
                menu_item(ui, theme_label, "Ctrl+Shift+T", Command::ToggleTheme, commands);
                ui.separator();
                menu_item(ui, "Next Tab", "Ctrl+Tab", Command::NextTab, commands);
                menu_item(ui, "Previous Tab", "Ctrl+Shift+Tab", Command::PrevTab, commands);
            });

            ui.menu_button("Format", |ui| {
                let Some(tab) = self.manager.active_tab() else {
                    return;
                };
                let mut wrap = tab.word_wrap();
                if ui.checkbox(&mut wrap, "Word Wrap").clicked() {
                    commands.push(Command::ToggleWordWrap);
                    ui.close_menu();
                }
                ui.separator();
                ui.label("Syntax");
                if ui.radio(tab.syntax().is_none(), "Plain Text").clicked() {
                    commands.push(Command::SetSyntax(None));
                    ui.close_menu();
                }
                for hint in SyntaxHint::all() {
                    if ui.radio(tab.syntax() == Some(*hint), hint.label()).clicked() {
                        commands.push(Command::SetSyntax(Some(*hint)));
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button("Help", |ui| {
                menu_item(ui, "About", "", Command::About, commands);
            });
        });
    }

    /// Entries of the Open Recent submenu.
    fn recent_files_menu(&self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let recent = self.manager.recent_files();
        if recent.is_empty() {
            ui.add_enabled(false, egui::Button::new("No recent files"));
        } else {
            for path in recent {
                if ui
                    .button(path.display().to_string())
                    .clicked()
                {
                    commands.push(Command::OpenRecent(path.clone()));
                    ui.close_menu();
                }
            }
        }
        ui.separator();
        if ui
            .add_enabled(!recent.is_empty(), egui::Button::new("Clear Recent Files"))
            .clicked()
        {
            commands.push(Command::ClearRecent);
            ui.close_menu();
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.horizontal(|ui| {
            if ui.button("New").on_hover_text("New (Ctrl+N)").clicked() {
                commands.push(Command::New);
            }
            if ui.button("Open").on_hover_text("Open (Ctrl+O)").clicked() {
                commands.push(Command::Open);
            }
            if ui.button("Save").on_hover_text("Save (Ctrl+S)").clicked() {
                commands.push(Command::Save);
            }

            ui.separator();

            let mut family_changed = false;
            egui::ComboBox::from_id_source("toolbar_font_family")
                .selected_text(self.font_family_input.clone())
                .show_ui(ui, |ui| {
                    for family in FONT_FAMILIES {
                        if ui
                            .selectable_value(
                                &mut self.font_family_input,
                                (*family).to_string(),
                                *family,
                            )
                            .clicked()
                        {
                            family_changed = true;
                        }
                    }
                });

            let size_response = ui.add(
                egui::TextEdit::singleline(&mut self.font_size_input)
                    .desired_width(40.0)
                    .hint_text("12"),
            );
            let size_submitted =
                size_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if family_changed || size_submitted {
                commands.push(Command::ApplyFont);
            }

            ui.separator();

            if ui.button("A+").on_hover_text("Zoom In (Ctrl++)").clicked() {
                commands.push(Command::ZoomIn);
            }
            if ui.button("A-").on_hover_text("Zoom Out (Ctrl+-)").clicked() {
                commands.push(Command::ZoomOut);
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Strip and Status Bar
    // ─────────────────────────────────────────────────────────────────────────

    fn render_tab_strip(&self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        egui::ScrollArea::horizontal()
            .id_source("tab_strip_scroll")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for (index, tab) in self.manager.tabs().iter().enumerate() {
                        let selected = index == self.manager.active_tab_index();
                        let response = ui.selectable_label(selected, tab.title());
                        let response = match tab.path() {
                            Some(path) => response.on_hover_text(path.display().to_string()),
                            None => response,
                        };

                        if response.clicked() {
                            commands.push(Command::ActivateTab(index));
                        }
                        if response.middle_clicked() {
                            commands.push(Command::CloseTab(index));
                        }
                        response.context_menu(|ui| {
                            if ui.button("Close").clicked() {
                                commands.push(Command::CloseTab(index));
                                ui.close_menu();
                            }
                            if ui.button("Close Others").clicked() {
                                commands.push(Command::CloseOthers(index));
                                ui.close_menu();
                            }
                            if ui.button("Close All").clicked() {
                                commands.push(Command::CloseAll);
                                ui.close_menu();
                            }
                        });

                        if ui.small_button("×").on_hover_text("Close").clicked() {
                            commands.push(Command::CloseTab(index));
                        }
                        ui.add_space(4.0);
                    }
                });
            });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(status) = self.manager.status_line() {
                ui.label(status.to_string());
            }
            if let Some(message) = &self.manager.ui.status_message {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(message).weak());
                });
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if self.manager.ui.show_error_modal
            && show_error_modal(ctx, &self.manager.ui.error_message)
        {
            self.manager.dismiss_error();
        }

        if self.manager.ui.show_about {
            let mut open = true;
            egui::Window::new(format!("About {}", APP_NAME))
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading(egui::RichText::new(APP_NAME).size(24.0).strong());
                        ui.label(
                            egui::RichText::new(format!(
                                "Version {}",
                                env!("CARGO_PKG_VERSION")
                            ))
                            .weak(),
                        );
                        ui.add_space(8.0);
                        ui.label("A tabbed plain-text editor");
                    });
                    ui.add_space(12.0);
                    ui.separator();
                    egui::Grid::new("about_shortcuts")
                        .num_columns(2)
                        .spacing([24.0, 4.0])
                        .show(ui, |ui| {
                            for (keys, action) in SHORTCUTS {
                                ui.label(egui::RichText::new(*keys).monospace());
                                ui.label(*action);
                                ui.end_row();
                            }
                        });
                });
            if !open {
                self.manager.ui.show_about = false;
            }
        }
    }
}

/// Shortcut reference shown in the About window.
const SHORTCUTS: &[(&str, &str)] = &[
    ("Ctrl+N", "New"),
    ("Ctrl+O", "Open"),
    ("Ctrl+S", "Save"),
    ("Ctrl+Shift+S", "Save As"),
    ("Ctrl+Alt+S", "Save All"),
    ("Ctrl+W", "Close Tab"),
    ("Ctrl+F", "Find"),
    ("Ctrl+H", "Replace"),
    ("F3", "Find Next"),
    ("Ctrl++ / Ctrl+- / Ctrl+0", "Zoom In / Out / Reset"),
    ("Ctrl+Shift+T", "Toggle Theme"),
    ("Ctrl+Tab", "Next Tab"),
];

/// Show the error modal. Returns `true` once it is dismissed.
///
/// The OK button holds keyboard focus while the modal is up, so Enter
/// dismisses it instead of reaching the editor.
fn show_error_modal(ctx: &egui::Context, message: &str) -> bool {
    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                let ok = ui.button("OK");
                let enter_on_ok =
                    ok.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ok.clicked() || enter_on_ok {
                    dismissed = true;
                } else {
                    ok.request_focus();
                }
            });
        });
    dismissed
}

/// Add a menu button with a shortcut hint that queues `command` on click.
fn menu_item(
    ui: &mut egui::Ui,
    label: &str,
    shortcut: &str,
    command: Command,
    commands: &mut Vec<Command>,
) {
    if ui
        .add(egui::Button::new(label).shortcut_text(shortcut))
        .clicked()
    {
        commands.push(command);
        ui.close_menu();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// eframe::App
// ─────────────────────────────────────────────────────────────────────────────

impl eframe::App for QuireApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.update_title(ctx);
        self.update_window_state(ctx);
        self.handle_close_request(ctx);
        self.refresh_font_inputs();

        let mut commands = Vec::new();
        if let Some(command) = self.detect_shortcut(ctx) {
            debug!("Keyboard shortcut: {:?}", command);
            commands.push(command);
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui, &mut commands);
        });
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui, &mut commands);
        });
        egui::TopBottomPanel::top("tab_strip").show(ctx, |ui| {
            self.render_tab_strip(ui, &mut commands);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.manager.active_tab_mut().map(|tab| {
                    let id = egui::Id::new("editor").with(tab.id());
                    EditorWidget::new(tab).id(id).show(ui)
                })
            })
            .inner;
        if output.is_some_and(|o| o.changed) {
            self.manager.clear_status();
        }

        self.render_find_panel(ctx);
        self.render_dialogs(ctx);

        for command in commands {
            self.dispatch(command);
        }

        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.should_exit {
            warn!("Window closed without the exit protocol, saving state");
            self.manager.shutdown();
        }
        info!("Application exiting");
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if self.manager.settings_dirty() {
            debug!("Saving application state");
            self.manager.save_settings();
        }
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
