// services/log-viewer/src/detail.rs
//
// Projection of one log record into the ordered sections of the detail pane
//

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use svckit::{LogLevel, LogRecord};

use crate::classify::{classify, flow_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Timestamp,
    FlowDirection,
    Level,
    Message,
    RequestId,
    Url,
    Method,
    Status,
    Headers,
    Body,
    Error,
    Transformations,
    RemovedFieldsDetail,
    RemovedField,
    FieldConversion,
    Payload,
    AllData,
}

/// How a section's text should be laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    /// Single value, shown inline.
    Plain(String),
    /// Pretty-printed JSON, shown as a block.
    Structured(String),
}

impl SectionBody {
    pub fn text(&self) -> &str {
        match self {
            SectionBody::Plain(text) | SectionBody::Structured(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Flow,
    Success,
    Failure,
    Level(LogLevel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub kind: SectionKind,
    pub label: String,
    pub body: SectionBody,
    /// Secondary labelled value shown under the body (removed value).
    pub attachment: Option<(String, SectionBody)>,
    pub tone: Tone,
    pub copy_text: String,
}

impl DetailSection {
    fn plain(kind: SectionKind, label: impl Into<String>, text: String) -> Self {
        Self {
            kind,
            label: label.into(),
            copy_text: text.clone(),
            body: SectionBody::Plain(text),
            attachment: None,
            tone: Tone::Neutral,
        }
    }

    fn from_body(kind: SectionKind, label: impl Into<String>, body: SectionBody) -> Self {
        Self {
            kind,
            label: label.into(),
            copy_text: body.text().to_string(),
            body,
            attachment: None,
            tone: Tone::Neutral,
        }
    }

    fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    /// Sections driven by a key in `data`, as opposed to the record header.
    pub fn is_optional(&self) -> bool {
        !matches!(
            self.kind,
            SectionKind::Timestamp | SectionKind::FlowDirection | SectionKind::Level | SectionKind::Message
        )
    }
}

type Projector = fn(&Value, &Map<String, Value>) -> DetailSection;

/// Optional sections in display order. Each entry fires independently when
/// its key is present in the record's data.
const OPTIONAL_SECTIONS: &[(&str, Projector)] = &[
    ("request_id", request_id_section),
    ("url", url_section),
    ("method", method_section),
    ("status", status_section),
    ("headers", headers_section),
    ("body", body_section),
    ("error", error_section),
    ("transformations", transformations_section),
    ("all_removed_fields_detail", removed_fields_detail_section),
    ("removed_field", removed_field_section),
    ("original_field", field_conversion_section),
    ("payload", payload_section),
];

pub fn project(record: &LogRecord, upstream: &str) -> Vec<DetailSection> {
    let mut sections = Vec::with_capacity(8);

    sections.push(DetailSection::plain(
        SectionKind::Timestamp,
        "Timestamp",
        timestamp_text(record),
    ));

    if let Some(label) = flow_label(classify(&record.message), upstream) {
        sections.push(
            DetailSection::plain(SectionKind::FlowDirection, "Flow Direction", label).with_tone(Tone::Flow),
        );
    }

    sections.push(
        DetailSection::plain(SectionKind::Level, "Level", record.level.clone())
            .with_tone(Tone::Level(record.presentation_level())),
    );
    sections.push(DetailSection::plain(SectionKind::Message, "Message", record.message.clone()));

    if let Some(data) = record.data.as_ref() {
        for (key, projector) in OPTIONAL_SECTIONS {
            if let Some(value) = data.get(*key).filter(|v| is_present(v)) {
                sections.push(projector(value, data));
            }
        }
    }

    if let Some(data) = record.extra_data() {
        sections.push(DetailSection::from_body(
            SectionKind::AllData,
            "All Data (JSON)",
            SectionBody::Structured(pretty(&Value::Object(data.clone()))),
        ));
    }

    sections
}

/// Present means set to something other than null, false, zero, an empty
/// string or an empty collection.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn timestamp_text(record: &LogRecord) -> String {
    record
        .instant()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| record.timestamp_text())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Strings verbatim, anything else as its JSON text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strings verbatim, anything else pretty-printed.
fn string_or_structured(value: &Value) -> SectionBody {
    match value {
        Value::String(s) => SectionBody::Plain(s.clone()),
        other => SectionBody::Structured(pretty(other)),
    }
}

fn element_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 1,
    }
}

fn status_code(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn request_id_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::plain(SectionKind::RequestId, "Request ID", scalar_text(value))
}

fn url_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::plain(SectionKind::Url, "URL", scalar_text(value))
}

fn method_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::plain(SectionKind::Method, "HTTP Method", scalar_text(value))
}

fn status_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    let tone = match status_code(value) {
        Some(code) if code >= 400.0 => Tone::Failure,
        _ => Tone::Success,
    };
    DetailSection::plain(SectionKind::Status, "Status Code", scalar_text(value)).with_tone(tone)
}

fn headers_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::from_body(SectionKind::Headers, "Headers", SectionBody::Structured(pretty(value)))
}

fn body_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::from_body(SectionKind::Body, "Request/Response Body", string_or_structured(value))
}

fn error_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::plain(SectionKind::Error, "Error Details", scalar_text(value)).with_tone(Tone::Failure)
}

fn transformations_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::from_body(
        SectionKind::Transformations,
        format!("Tool Transformations ({} tools)", element_count(value)),
        SectionBody::Structured(pretty(value)),
    )
}

fn removed_fields_detail_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::from_body(
        SectionKind::RemovedFieldsDetail,
        format!("Removed Fields Detail ({} fields)", element_count(value)),
        SectionBody::Structured(pretty(value)),
    )
}

fn removed_field_section(value: &Value, data: &Map<String, Value>) -> DetailSection {
    let mut section = DetailSection::plain(SectionKind::RemovedField, "Removed Field", scalar_text(value));
    if let Some(removed) = data.get("removed_value").filter(|v| is_present(v)) {
        let body = string_or_structured(removed);
        section.copy_text = format!("{}\n{}", section.copy_text, body.text());
        section.attachment = Some(("Removed Value".to_string(), body));
    }
    section
}

fn field_conversion_section(value: &Value, data: &Map<String, Value>) -> DetailSection {
    let compact = |key: &str| data.get(key).map(Value::to_string).unwrap_or_default();
    let converted_field = data.get("converted_field").map(scalar_text).unwrap_or_default();
    let text = format!(
        "{}: {} → {}: {}",
        scalar_text(value),
        compact("original_value"),
        converted_field,
        compact("converted_value"),
    );
    DetailSection::plain(SectionKind::FieldConversion, "Field Conversion", text)
}

fn payload_section(value: &Value, _: &Map<String, Value>) -> DetailSection {
    DetailSection::from_body(SectionKind::Payload, "Full Payload", SectionBody::Structured(pretty(value)))
}
