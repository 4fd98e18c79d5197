// services/log-viewer/src/mock.rs
//
// Simulated proxy for demo mode: produces request/response/stream traffic
// shaped like the real proxy's log buffer

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use svckit::{HealthSnapshot, LogLevel, LogRecord, ViewerError};

use crate::api::LogSource;

/// Matches the proxy's own buffer bound.
pub const MAX_BUFFERED: usize = 1000;

const MODELS: [&str; 3] = ["gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.0-flash-lite"];

struct MockState {
    buffer: VecDeque<LogRecord>,
    tick_count: u64,
    users: u64,
}

pub struct MockLogSource {
    upstream: String,
    state: Mutex<MockState>,
}

impl MockLogSource {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            state: Mutex::new(MockState {
                buffer: VecDeque::new(),
                tick_count: 0,
                users: 1,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockState>, ViewerError> {
        self.state
            .lock()
            .map_err(|_| ViewerError::Unknown("mock state poisoned".to_string()))
    }

    /// Advance the simulation by one poll's worth of traffic.
    fn step(&self, state: &mut MockState) {
        state.tick_count += 1;
        let mut rng = rand::thread_rng();

        if state.tick_count == 1 {
            push(state, LogRecord::new(LogLevel::Info, "WebSocket client connected").with_data(data(json!({
                "user_id": Uuid::new_v4().to_string(),
                "remote_addr": "127.0.0.1:53122",
            }))));
        }

        let exchanges = rng.gen_range(0..3);
        for _ in 0..exchanges {
            let records = self.exchange(&mut rng);
            for record in records {
                push(state, record);
            }
        }

        if rng.gen_ratio(1, 10) {
            state.users = (state.users + 1).min(8);
        } else if rng.gen_ratio(1, 20) {
            state.users = state.users.saturating_sub(1).max(1);
        }
    }

    /// One proxied request and whatever came back for it.
    fn exchange(&self, rng: &mut impl Rng) -> Vec<LogRecord> {
        let request_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let model = MODELS.choose(rng).copied().unwrap_or(MODELS[0]);
        let streaming = rng.gen_bool(0.5);
        let action = if streaming { "streamGenerateContent" } else { "generateContent" };
        let url = format!("/v1beta/models/{}:{}", model, action);

        let mut records = vec![LogRecord::new(
            LogLevel::Info,
            format!("[REQUEST {}] POST {}", request_id, url),
        )
        .with_data(data(json!({
            "request_id": request_id,
            "method": "POST",
            "url": url,
            "headers": {"content-type": "application/json", "x-goog-api-client": "genai-js/1.0"},
            "body": format!(r#"{{"contents":[{{"role":"user","parts":[{{"text":"prompt {}"}}]}}]}}"#, request_id),
        })))];

        if rng.gen_ratio(1, 4) {
            records.push(self.tool_transformation(&request_id));
        }
        if rng.gen_ratio(1, 6) {
            records.push(LogRecord::new(
                LogLevel::Warn,
                format!("Removed unsupported 'role' field from systemInstruction ({})", request_id),
            )
            .with_data(data(json!({"removed_field": "role", "removed_value": "system"}))));
        }
        if rng.gen_ratio(1, 6) {
            records.push(LogRecord::new(
                LogLevel::Info,
                format!("Converted thinkingLevel to thinkingBudget ({})", request_id),
            )
            .with_data(data(json!({
                "original_field": "thinkingLevel",
                "original_value": "high",
                "converted_field": "thinkingBudget",
                "converted_value": 24576,
            }))));
        }

        records.push(LogRecord::new(
            LogLevel::Info,
            format!("[REQUEST {}] Sent to WebSocket client", request_id),
        )
        .with_data(data(json!({"request_id": request_id}))));

        let roll: u32 = rng.gen_range(0..100);
        if roll < 8 {
            let status = *[500_u16, 502, 503].choose(rng).unwrap_or(&500);
            records.push(LogRecord::new(
                LogLevel::Error,
                format!("[ERROR {}] Status: {}", request_id, status),
            )
            .with_data(data(json!({
                "request_id": request_id,
                "status": status,
                "error": format!("{} returned {}", self.upstream, status),
                "url": url,
                "method": "POST",
                "body": {"error": {"code": status, "message": "The service is currently unavailable.", "status": "UNAVAILABLE"}},
                "payload": {"event_type": "response_headers", "status": status, "request_id": request_id},
            }))));
        } else if streaming && roll < 14 {
            records.push(LogRecord::new(
                LogLevel::Warn,
                format!("[STREAM ERROR {}] Status: 429 - Waiting for error body in chunks", request_id),
            )
            .with_data(data(json!({
                "request_id": request_id,
                "status": 429,
                "headers": {"retry-after": "12"},
            }))));
        } else if streaming {
            records.push(LogRecord::new(
                LogLevel::Info,
                format!("[RESPONSE {}] Status: 200", request_id),
            )
            .with_data(data(json!({
                "request_id": request_id,
                "status": 200,
                "headers": {"content-type": "text/event-stream"},
            }))));
            for chunk in 0..rng.gen_range(1..4) {
                records.push(LogRecord::new(
                    LogLevel::Debug,
                    format!("[STREAM {}] chunk {}", request_id, chunk),
                )
                .with_data(data(json!({
                    "request_id": request_id,
                    "payload": {"candidates": [{"content": {"parts": [{"text": format!("partial {}", chunk)}]}}]},
                }))));
            }
        } else {
            records.push(LogRecord::new(
                LogLevel::Info,
                format!("[RESPONSE {}] Status: 200", request_id),
            )
            .with_data(data(json!({
                "request_id": request_id,
                "status": 200,
                "headers": {"content-type": "application/json"},
                "body": {"candidates": [{"content": {"parts": [{"text": "done"}]}, "finishReason": "STOP"}]},
            }))));
        }

        records
    }

    fn tool_transformation(&self, request_id: &str) -> LogRecord {
        LogRecord::new(
            LogLevel::Debug,
            format!("Transformed 2 tool declarations ({})", request_id),
        )
        .with_data(data(json!({
            "total_tools": 2,
            "total_removed_fields": 2,
            "transformations": [
                {"tool": "search_files", "removed_fields": ["additionalProperties"]},
                {"tool": "run_command", "removed_fields": ["$schema"]},
            ],
            "all_removed_fields_detail": {
                "additionalProperties": ["search_files"],
                "$schema": ["run_command"],
            },
        })))
    }
}

fn push(state: &mut MockState, record: LogRecord) {
    state.buffer.push_back(record);
    while state.buffer.len() > MAX_BUFFERED {
        state.buffer.pop_front();
    }
}

fn data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn fetch_logs(&self) -> Result<Vec<LogRecord>, ViewerError> {
        let mut state = self.lock()?;
        self.step(&mut state);
        Ok(state.buffer.iter().cloned().collect())
    }

    async fn fetch_health(&self) -> Result<HealthSnapshot, ViewerError> {
        let state = self.lock()?;
        Ok(HealthSnapshot {
            status: "healthy".to_string(),
            active_users: state.users,
            active_connections: state.users * 2,
            log_buffer_size: Some(state.buffer.len() as u64),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        })
    }

    fn describe(&self) -> String {
        format!("demo ({})", self.upstream)
    }
}
