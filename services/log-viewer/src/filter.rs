// services/log-viewer/src/filter.rs
//
// Level filter and free-text search over the polled log list
//

use std::fmt;
use std::str::FromStr;

use svckit::{LogLevel, LogRecord, ViewerError};

/// Level filter: the wildcard or exactly one of the four levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LogLevel),
}

impl LevelFilter {
    /// Button order: ALL, ERROR, WARN, INFO, DEBUG.
    pub const CHOICES: [LevelFilter; 5] = [
        LevelFilter::All,
        LevelFilter::Only(LogLevel::Error),
        LevelFilter::Only(LogLevel::Warn),
        LevelFilter::Only(LogLevel::Info),
        LevelFilter::Only(LogLevel::Debug),
    ];

    /// Compares the record's raw level text, so unknown levels only pass `All`.
    pub fn admits(&self, level: &str) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(wanted) => wanted.as_str() == level,
        }
    }

    pub fn cycle(self) -> Self {
        let idx = Self::CHOICES.iter().position(|c| *c == self).unwrap_or(0);
        Self::CHOICES[(idx + 1) % Self::CHOICES.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            LevelFilter::All => "ALL",
            LevelFilter::Only(level) => level.as_str(),
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LevelFilter {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == "ALL" {
            return Ok(LevelFilter::All);
        }
        LogLevel::parse(&upper)
            .map(LevelFilter::Only)
            .ok_or_else(|| ViewerError::ConfigError(format!("unknown level filter: {}", s)))
    }
}

/// Current filter criteria. The lowercased search needle is cached so the
/// per-record check does not re-lowercase the term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    level: LevelFilter,
    search: String,
    needle: String,
}

impl LogFilter {
    pub fn new(level: LevelFilter, search: impl Into<String>) -> Self {
        let mut filter = Self {
            level,
            ..Self::default()
        };
        filter.set_search(search);
        filter
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.needle = self.search.to_lowercase();
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if !self.level.admits(&record.level) {
            return false;
        }
        if self.needle.is_empty() {
            return true;
        }
        record.message.to_lowercase().contains(&self.needle)
            || record.data_json().to_lowercase().contains(&self.needle)
    }
}

/// Records passing `filter`, in their original order.
pub fn apply<'a>(logs: &'a [LogRecord], filter: &LogFilter) -> Vec<&'a LogRecord> {
    logs.iter().filter(|record| filter.matches(record)).collect()
}

/// Same as [`apply`], as positions into `logs`.
pub fn matching_indices(logs: &[LogRecord], filter: &LogFilter) -> Vec<usize> {
    logs.iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(idx, _)| idx)
        .collect()
}

/// Per-level counts of the unfiltered list, for the filter buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub total: usize,
    pub error: usize,
    pub warn: usize,
    pub info: usize,
    pub debug: usize,
}

impl LevelCounts {
    pub fn from_logs(logs: &[LogRecord]) -> Self {
        let mut counts = Self {
            total: logs.len(),
            ..Self::default()
        };
        for record in logs {
            match record.parsed_level() {
                Some(LogLevel::Error) => counts.error += 1,
                Some(LogLevel::Warn) => counts.warn += 1,
                Some(LogLevel::Info) => counts.info += 1,
                Some(LogLevel::Debug) => counts.debug += 1,
                None => {}
            }
        }
        counts
    }

    pub fn for_filter(&self, filter: LevelFilter) -> usize {
        match filter {
            LevelFilter::All => self.total,
            LevelFilter::Only(LogLevel::Error) => self.error,
            LevelFilter::Only(LogLevel::Warn) => self.warn,
            LevelFilter::Only(LogLevel::Info) => self.info,
            LevelFilter::Only(LogLevel::Debug) => self.debug,
        }
    }
}
