// services/log-viewer/src/state.rs
//
// View state: the polled log list, filter criteria and everything derived from them
//

use tracing::{debug, warn};

use svckit::{HealthSnapshot, LogRecord};

use crate::detail::{project, DetailSection, SectionKind};
use crate::filter::{matching_indices, LevelCounts, LevelFilter, LogFilter};
use crate::poller::PollEvent;

/// The record shown in the detail pane. Held by value, so it survives a
/// refresh that no longer contains it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(LogRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    ConfirmClear,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    logs: Vec<LogRecord>,
    filtered: Vec<usize>,
    counts: LevelCounts,
    filter: LogFilter,
    selection: Selection,
    upstream: String,

    pub health: Option<HealthSnapshot>,
    pub auto_refresh: bool,

    // Connection indicator
    pub connected: bool,
    pub last_error: Option<String>,
    pub polls_applied: u64,

    // UI state
    pub cursor: usize,
    pub detail_cursor: usize,
    pub input_mode: InputMode,
    pub notice: Option<String>,
}

impl ViewState {
    pub fn new(upstream: impl Into<String>, filter: LogFilter, auto_refresh: bool) -> Self {
        Self {
            logs: Vec::new(),
            filtered: Vec::new(),
            counts: LevelCounts::default(),
            filter,
            selection: Selection::NoSelection,
            upstream: upstream.into(),
            health: None,
            auto_refresh,
            connected: false,
            last_error: None,
            polls_applied: 0,
            cursor: 0,
            detail_cursor: 0,
            input_mode: InputMode::Normal,
            notice: None,
        }
    }

    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn filtered(&self) -> impl Iterator<Item = &LogRecord> + '_ {
        self.filtered.iter().map(|idx| &self.logs[*idx])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn counts(&self) -> LevelCounts {
        self.counts
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> Option<&LogRecord> {
        match &self.selection {
            Selection::Selected(record) => Some(record),
            Selection::NoSelection => None,
        }
    }

    /// Selected record no longer appears in the latest list.
    pub fn selection_is_stale(&self) -> bool {
        self.selected()
            .is_some_and(|record| !self.logs.iter().any(|r| r == record))
    }

    pub fn record_at_cursor(&self) -> Option<&LogRecord> {
        self.filtered.get(self.cursor).map(|idx| &self.logs[*idx])
    }

    /// Apply one poll completion. Failures keep the previous state.
    pub fn apply_poll(&mut self, event: PollEvent) {
        match event {
            PollEvent::Logs(Ok(logs)) => {
                debug!("Applying {} log records", logs.len());
                self.logs = logs;
                self.mark_connected();
                self.recompute();
            }
            PollEvent::Health(Ok(health)) => {
                self.health = Some(health);
                self.mark_connected();
            }
            PollEvent::Logs(Err(e)) => self.mark_failed("logs", &e),
            PollEvent::Health(Err(e)) => self.mark_failed("health", &e),
        }
    }

    fn mark_connected(&mut self) {
        self.connected = true;
        self.last_error = None;
        self.polls_applied += 1;
    }

    fn mark_failed(&mut self, endpoint: &str, error: &svckit::ViewerError) {
        if error.is_transient() {
            warn!("Failed to fetch {}: {}", endpoint, error);
        } else {
            tracing::error!("Failed to fetch {}: {}", endpoint, error);
        }
        self.connected = false;
        self.last_error = Some(format!("{}: {}", endpoint, error));
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.set_search(term);
        self.recompute();
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut term = self.filter.search().to_string();
        term.push(c);
        self.set_search(term);
    }

    pub fn pop_search_char(&mut self) {
        let mut term = self.filter.search().to_string();
        if term.pop().is_some() {
            self.set_search(term);
        }
    }

    pub fn set_level_filter(&mut self, level: LevelFilter) {
        self.filter.set_level(level);
        self.recompute();
    }

    pub fn cycle_level_filter(&mut self) {
        self.set_level_filter(self.filter.level().cycle());
    }

    /// Re-derive the filtered view and counts from scratch.
    fn recompute(&mut self) {
        self.filtered = matching_indices(&self.logs, &self.filter);
        self.counts = LevelCounts::from_logs(&self.logs);
        if self.auto_refresh {
            self.follow_tail();
        } else {
            self.clamp_cursor();
        }
    }

    fn follow_tail(&mut self) {
        self.cursor = self.filtered.len().saturating_sub(1);
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.filtered.len().saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let last = self.filtered.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_to_end(&mut self) {
        self.follow_tail();
    }

    /// Select the displayed record at `position` in the filtered list.
    pub fn select(&mut self, position: usize) -> bool {
        match self.filtered.get(position) {
            Some(idx) => {
                self.selection = Selection::Selected(self.logs[*idx].clone());
                self.cursor = position;
                self.detail_cursor = 0;
                true
            }
            None => false,
        }
    }

    pub fn select_at_cursor(&mut self) -> bool {
        self.select(self.cursor)
    }

    pub fn dismiss(&mut self) {
        self.selection = Selection::NoSelection;
        self.detail_cursor = 0;
    }

    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.auto_refresh = !self.auto_refresh;
        if self.auto_refresh {
            self.follow_tail();
        }
        self.auto_refresh
    }

    pub fn detail_sections(&self) -> Vec<DetailSection> {
        self.selected()
            .map(|record| project(record, &self.upstream))
            .unwrap_or_default()
    }

    pub fn move_detail_cursor(&mut self, delta: isize) {
        let last = self.detail_sections().len().saturating_sub(1);
        self.detail_cursor = self.detail_cursor.saturating_add_signed(delta).min(last);
    }

    /// Copy text of the focused detail section.
    pub fn focused_copy_text(&self) -> Option<(String, String)> {
        self.detail_sections()
            .into_iter()
            .nth(self.detail_cursor)
            .map(|section| (section.label, section.copy_text))
    }

    /// Copy text of the catch-all section: the entire `data` mapping.
    pub fn all_data_copy_text(&self) -> Option<String> {
        self.detail_sections()
            .into_iter()
            .find(|section| section.kind == SectionKind::AllData)
            .map(|section| section.copy_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use svckit::{LogLevel, ViewerError};

    fn record(level: &str, message: &str, data: serde_json::Value) -> LogRecord {
        serde_json::from_value(json!({
            "timestamp": "2025-03-01T12:00:00Z",
            "level": level,
            "message": message,
            "data": data,
        }))
        .unwrap()
    }

    fn scenario_logs() -> Vec<LogRecord> {
        vec![
            record("ERROR", "[REQUEST] boom", json!({"status": 500})),
            record("INFO", "ok", json!({})),
        ]
    }

    fn paused_state() -> ViewState {
        ViewState::new("Upstream API", LogFilter::default(), false)
    }

    #[test]
    fn test_poll_replaces_logs_wholesale() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        assert_eq!(state.logs().len(), 2);

        state.apply_poll(PollEvent::Logs(Ok(vec![record("DEBUG", "only", json!({}))])));
        assert_eq!(state.logs().len(), 1);
        assert_eq!(state.counts().debug, 1);
        assert_eq!(state.counts().total, 1);
        assert!(state.connected);
    }

    #[test]
    fn test_failed_poll_keeps_previous_state() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        state.apply_poll(PollEvent::Health(Ok(HealthSnapshot {
            status: "healthy".to_string(),
            active_users: 2,
            active_connections: 3,
            ..Default::default()
        })));

        state.apply_poll(PollEvent::Logs(Err(ViewerError::NetworkError("refused".to_string()))));
        state.apply_poll(PollEvent::Health(Err(ViewerError::DecodeError("html".to_string()))));

        assert_eq!(state.logs().len(), 2);
        assert_eq!(state.health.as_ref().unwrap().active_connections, 3);
        assert!(!state.connected);
        assert!(state.last_error.as_deref().unwrap().starts_with("health:"));
    }

    #[test]
    fn test_filter_changes_recompute_view() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));

        state.set_level_filter(LevelFilter::Only(LogLevel::Error));
        let shown: Vec<&str> = state.filtered().map(|r| r.message.as_str()).collect();
        assert_eq!(shown, vec!["[REQUEST] boom"]);

        state.set_level_filter(LevelFilter::All);
        state.set_search("ok");
        let shown: Vec<&str> = state.filtered().map(|r| r.message.as_str()).collect();
        assert_eq!(shown, vec!["ok"]);

        state.set_search("nothing matches this");
        assert_eq!(state.filtered_len(), 0);
        assert!(state.record_at_cursor().is_none());
        // counts are over the unfiltered list
        assert_eq!(state.counts().total, 2);
    }

    #[test]
    fn test_search_editing() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        for c in "BOO".chars() {
            state.push_search_char(c);
        }
        assert_eq!(state.filter().search(), "BOO");
        assert_eq!(state.filtered_len(), 1);
        state.pop_search_char();
        state.pop_search_char();
        state.pop_search_char();
        state.pop_search_char();
        assert_eq!(state.filter().search(), "");
        assert_eq!(state.filtered_len(), 2);
    }

    #[test]
    fn test_selection_survives_refresh() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        assert!(state.select(0));
        assert!(!state.selection_is_stale());

        state.apply_poll(PollEvent::Logs(Ok(vec![record("INFO", "new", json!({}))])));
        assert_eq!(state.selected().unwrap().message, "[REQUEST] boom");
        assert!(state.selection_is_stale());

        state.dismiss();
        assert_eq!(state.selection(), &Selection::NoSelection);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        assert!(!state.select(5));
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_follow_tail_when_auto_refresh() {
        let mut state = ViewState::new("Upstream API", LogFilter::default(), true);
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        assert_eq!(state.cursor, 1);

        state.toggle_auto_refresh();
        state.move_cursor(-5);
        assert_eq!(state.cursor, 0);
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        assert_eq!(state.cursor, 0);

        assert!(state.toggle_auto_refresh());
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(scenario_logs())));
        state.move_cursor(10);
        assert_eq!(state.cursor, 1);
        state.set_level_filter(LevelFilter::Only(LogLevel::Info));
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_copy_texts_follow_detail_cursor() {
        let mut state = paused_state();
        state.apply_poll(PollEvent::Logs(Ok(vec![record(
            "INFO",
            "[RESPONSE r] Status: 200",
            json!({"request_id": "r", "body": "hello"}),
        )])));
        state.select(0);

        // Timestamp, Flow, Level, Message, Request ID, Body, All Data
        assert_eq!(state.detail_sections().len(), 7);
        state.move_detail_cursor(5);
        let (label, text) = state.focused_copy_text().unwrap();
        assert_eq!(label, "Request/Response Body");
        assert_eq!(text, "hello");

        state.move_detail_cursor(100);
        assert_eq!(state.detail_cursor, 6);

        let all: serde_json::Value = serde_json::from_str(&state.all_data_copy_text().unwrap()).unwrap();
        assert_eq!(all, json!({"request_id": "r", "body": "hello"}));
    }

    #[test]
    fn test_no_selection_has_no_sections() {
        let state = paused_state();
        assert!(state.detail_sections().is_empty());
        assert!(state.focused_copy_text().is_none());
        assert!(state.all_data_copy_text().is_none());
    }
}
