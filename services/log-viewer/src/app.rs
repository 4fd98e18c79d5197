// services/log-viewer/src/app.rs
//
// Keyboard handling on top of the view state

use std::path::PathBuf;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::export::export_logs;
use crate::filter::LevelFilter;
use crate::state::{InputMode, ViewState};

/// Side effects the event loop has to carry out after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    SetPolling(bool),
    RefreshLogs,
}

pub struct App {
    pub state: ViewState,
    pub demo: bool,
    pub source_label: String,
    clipboard: Box<dyn Clipboard>,
    export_dir: PathBuf,
}

impl App {
    pub fn new(
        state: ViewState,
        clipboard: Box<dyn Clipboard>,
        export_dir: PathBuf,
        demo: bool,
        source_label: String,
    ) -> Self {
        Self {
            state,
            demo,
            source_label,
            clipboard,
            export_dir,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        match self.state.input_mode {
            InputMode::Normal => self.handle_normal(key),
            InputMode::Search => {
                self.handle_search(key);
                Command::None
            }
            InputMode::ConfirmClear => self.handle_confirm_clear(key),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) -> Command {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }

        self.state.notice = None;
        match key.code {
            KeyCode::Char('q') => return Command::Quit,
            KeyCode::Esc => {
                if self.state.selected().is_none() {
                    return Command::Quit;
                }
                self.state.dismiss();
            }
            KeyCode::Char('/') => self.state.input_mode = InputMode::Search,
            KeyCode::Tab | KeyCode::Char('l') => self.state.cycle_level_filter(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.set_level_filter(LevelFilter::CHOICES[idx]);
            }
            KeyCode::Char(' ') => {
                let enabled = self.state.toggle_auto_refresh();
                return Command::SetPolling(enabled);
            }
            KeyCode::Enter => {
                self.state.select_at_cursor();
            }
            KeyCode::Char('x') => self.state.dismiss(),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_cursor(1),
            KeyCode::PageUp => self.state.move_cursor(-10),
            KeyCode::PageDown => self.state.move_cursor(10),
            KeyCode::Home | KeyCode::Char('g') => self.state.cursor_to_start(),
            KeyCode::End | KeyCode::Char('G') => self.state.cursor_to_end(),
            KeyCode::Char('[') => self.state.move_detail_cursor(-1),
            KeyCode::Char(']') => self.state.move_detail_cursor(1),
            KeyCode::Char('y') => self.copy_focused_section(),
            KeyCode::Char('Y') => self.copy_all_data(),
            KeyCode::Char('d') => self.download(),
            KeyCode::Char('c') => self.state.input_mode = InputMode::ConfirmClear,
            _ => {}
        }
        Command::None
    }

    fn handle_search(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.set_search("");
            }
            KeyCode::Char(c) => self.state.push_search_char(c),
            _ => {}
        }
    }

    /// Clearing only re-fetches; the proxy keeps its buffer.
    fn handle_confirm_clear(&mut self, key: KeyEvent) -> Command {
        self.state.input_mode = InputMode::Normal;
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.state.notice = Some("Refreshing logs from proxy".to_string());
                Command::RefreshLogs
            }
            _ => {
                self.state.notice = None;
                Command::None
            }
        }
    }

    fn copy_focused_section(&mut self) {
        match self.state.focused_copy_text() {
            Some((label, text)) => self.copy(&label, &text),
            None => self.state.notice = Some("Select a log first (Enter)".to_string()),
        }
    }

    fn copy_all_data(&mut self) {
        match self.state.all_data_copy_text() {
            Some(text) => self.copy("All Data", &text),
            None => self.state.notice = Some("No data to copy".to_string()),
        }
    }

    fn copy(&mut self, label: &str, text: &str) {
        match self.clipboard.set(text) {
            Ok(()) => self.state.notice = Some(format!("Copied {}", label)),
            Err(e) => {
                warn!("Copy of {} failed: {}", label, e);
                self.state.notice = Some(format!("Copy failed: {}", e));
            }
        }
    }

    fn download(&mut self) {
        match export_logs(self.state.logs(), &self.export_dir, Utc::now()) {
            Ok(path) => {
                info!("Logs downloaded to {}", path.display());
                self.state.notice = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                self.state.notice = Some(format!("Download failed: {}", e));
            }
        }
    }
}
