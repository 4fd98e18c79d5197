use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ViewerError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5345";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Where the proxy's monitoring endpoints live and how often to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    /// No timeout unless set; a hung request just leaves state stale.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: None,
        }
    }
}

impl ApiConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.poll_interval_ms == 0 {
            return Err(ViewerError::ConfigError(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ViewerError::ConfigError(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "log-viewer.log".to_string(),
        }
    }
}
