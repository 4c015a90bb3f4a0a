use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::feed::ReconnectPolicy;
use crate::projector::ViewWindow;

pub const BUILTIN_INSPECTOR_CONFIG: &str = include_str!("data/inspector_config.json");
pub const CONFIG_PATH_ENV: &str = "BRAID_INSPECTOR_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub feed: FeedConfig,
    pub view: ViewConfig,
    pub render: RenderConfig,
}

impl InspectorConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_INSPECTOR_CONFIG)
            .expect("builtin inspector config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = InspectorConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse inspector config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read inspector config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub endpoint: String,
    pub reconnect: bool,
    pub reconnect_delay_ms: u64,
}

impl FeedConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        if self.reconnect {
            ReconnectPolicy::Fixed(Duration::from_millis(self.reconnect_delay_ms))
        } else {
            ReconnectPolicy::Disabled
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:3030/ws".to_string(),
            reconnect: true,
            reconnect_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub window_size: usize,
    pub auto_scroll: bool,
}

impl ViewConfig {
    pub fn window(&self) -> ViewWindow {
        ViewWindow {
            size: self.window_size.max(1),
            auto_scroll: self.auto_scroll,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            auto_scroll: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tick_interval_ms: u64,
    pub max_logs: usize,
}

impl RenderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_logs: 8,
        }
    }
}

/// Metadata about where the active configuration came from.
#[derive(Debug, Clone)]
pub struct InspectorConfigMetadata {
    path: Option<PathBuf>,
}

impl InspectorConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load from `BRAID_INSPECTOR_CONFIG_PATH`, falling back to the builtin document.
pub fn load_inspector_config_from_env() -> (InspectorConfig, InspectorConfigMetadata) {
    load_inspector_config(env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
}

pub fn load_inspector_config(
    override_path: Option<PathBuf>,
) -> (InspectorConfig, InspectorConfigMetadata) {
    if let Some(path) = override_path {
        match InspectorConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "braid::config",
                    path = %path.display(),
                    "inspector_config.loaded=file"
                );
                return (config, InspectorConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "braid::config",
                    path = %path.display(),
                    error = %err,
                    "inspector_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "braid::config", "inspector_config.loaded=builtin");
    (InspectorConfig::builtin(), InspectorConfigMetadata::new(None))
}
