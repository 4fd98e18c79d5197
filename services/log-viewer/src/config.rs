// services/log-viewer/src/config.rs
//
// Layered configuration: defaults, optional file, LOG_VIEWER_* environment, CLI flags

use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use svckit::config::{ApiConfig, ObservabilityConfig};

use crate::filter::LevelFilter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub api: ApiConfig,
    pub view: ViewConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Name of the service behind the proxy, used in flow labels.
    pub upstream_name: String,
    pub initial_level: String,
    pub auto_refresh: bool,
    pub export_dir: PathBuf,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            upstream_name: "Upstream API".to_string(),
            initial_level: "ALL".to_string(),
            auto_refresh: true,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ViewConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        Ok(self.initial_level.parse::<LevelFilter>()?)
    }
}

/// Command-line values that win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub refresh_ms: Option<u64>,
    pub upstream: Option<String>,
    pub level: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<String>,
    pub paused: bool,
}

pub fn load_config(path: Option<&str>, overrides: Overrides) -> Result<ViewerConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("LOG_VIEWER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut viewer: ViewerConfig = config.try_deserialize()?;
    viewer.apply(overrides);
    viewer.api.validate()?;
    viewer.view.level_filter()?;
    Ok(viewer)
}

impl ViewerConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.api_url {
            self.api.base_url = url;
        }
        if let Some(ms) = overrides.refresh_ms {
            self.api.poll_interval_ms = ms;
        }
        if let Some(upstream) = overrides.upstream {
            self.view.upstream_name = upstream;
        }
        if let Some(level) = overrides.level {
            self.view.initial_level = level;
        }
        if let Some(dir) = overrides.export_dir {
            self.view.export_dir = dir;
        }
        if let Some(file) = overrides.log_file {
            self.observability.log_file = file;
        }
        if overrides.paused {
            self.view.auto_refresh = false;
        }
    }
}
