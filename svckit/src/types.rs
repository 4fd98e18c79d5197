use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Severity of a log record as emitted by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Exact, case-sensitive match against the four canonical names.
    pub fn parse(raw: &str) -> Option<Self> {
        LogLevel::ALL.into_iter().find(|level| level.as_str() == raw)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured event from the proxy's log buffer.
///
/// `timestamp` and `level` are kept exactly as received so that an export
/// writes back what the proxy served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Value::String(Utc::now().to_rfc3339()),
            level: level.as_str().to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Epoch numbers are milliseconds; strings are RFC 3339, or an ISO
    /// date-time without an offset, read as local time.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match &self.timestamp {
            Value::Number(n) => {
                let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
                Utc.timestamp_millis_opt(millis).single()
            }
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| parse_local_iso(s)),
            _ => None,
        }
    }

    pub fn timestamp_text(&self) -> String {
        match &self.timestamp {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn parsed_level(&self) -> Option<LogLevel> {
        LogLevel::parse(&self.level)
    }

    /// Unrecognised levels are presented as INFO.
    pub fn presentation_level(&self) -> LogLevel {
        self.parsed_level().unwrap_or(LogLevel::Info)
    }

    /// The structured payload, if present and non-empty.
    pub fn extra_data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().filter(|data| !data.is_empty())
    }

    pub fn data_field_count(&self) -> usize {
        self.data.as_ref().map_or(0, Map::len)
    }

    /// Compact JSON of `data`, `{}` when absent.
    pub fn data_json(&self) -> String {
        match &self.data {
            Some(data) => serde_json::to_string(data).unwrap_or_default(),
            None => "{}".to_string(),
        }
    }
}

const LOCAL_ISO_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

fn parse_local_iso(raw: &str) -> Option<DateTime<Utc>> {
    let naive = LOCAL_ISO_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Counters reported by `GET /api/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub active_connections: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_buffer_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of `GET /api/logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Option<Vec<LogRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl LogsResponse {
    pub fn into_logs(self) -> Vec<LogRecord> {
        self.logs.unwrap_or_default()
    }
}
