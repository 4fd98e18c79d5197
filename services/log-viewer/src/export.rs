// services/log-viewer/src/export.rs
//
// "Download logs": write the full current list to a timestamped JSON file

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use svckit::{LogRecord, ViewerError};

/// `logs-2025-03-01T12-30-45.123Z.json`; sorts by name in time order.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("logs-{}.json", now.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}

/// Writes every record in `logs` (not the filtered view) as pretty JSON.
pub fn export_logs(logs: &[LogRecord], dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, ViewerError> {
    let body = serde_json::to_string_pretty(logs)
        .map_err(|e| ViewerError::ExportError(e.to_string()))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));
    fs::write(&path, body)?;

    info!("Exported {} log records to {}", logs.len(), path.display());
    Ok(path)
}
