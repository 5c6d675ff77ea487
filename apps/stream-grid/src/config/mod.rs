use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::demo::{default_demo_dir, DEFAULT_DEMO_FILES};
use crate::grid::Layout;
use crate::tile::PlaybackOptions;

/// Longest read-ahead window accepted from configuration.
const MAX_CACHING_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub grid: GridConfig,
    pub playback: PlaybackConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Read-ahead for URI sources, in milliseconds
    pub network_caching_ms: u64,
    /// Read-ahead for local files, in milliseconds
    pub file_caching_ms: u64,
    pub software_decode: bool,
    /// Element used for video output instead of playbin's default
    pub video_sink: Option<String>,
    pub audio_sink: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    pub directory: Option<PathBuf>,
    pub files: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Stream Grid".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 2, columns: 2 }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            network_caching_ms: 300,
            file_caching_ms: 300,
            software_decode: true,
            video_sink: None,
            audio_sink: None,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            directory: None,
            files: DEFAULT_DEMO_FILES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl PlaybackConfig {
    pub fn options(&self) -> PlaybackOptions {
        PlaybackOptions {
            network_read_ahead: Duration::from_millis(self.network_caching_ms),
            file_read_ahead: Duration::from_millis(self.file_caching_ms),
            software_decode: self.software_decode,
        }
    }
}

impl DemoConfig {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_demo_dir)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.grid.rows == 0 || self.grid.columns == 0 {
            return Err(format!(
                "grid must have at least one row and one column, got {}x{}",
                self.grid.rows, self.grid.columns
            ));
        }

        if self.playback.network_caching_ms > MAX_CACHING_MS {
            return Err(format!(
                "network_caching_ms cannot exceed {} ms",
                MAX_CACHING_MS
            ));
        }
        if self.playback.file_caching_ms > MAX_CACHING_MS {
            return Err(format!("file_caching_ms cannot exceed {} ms", MAX_CACHING_MS));
        }

        if self.demo.files.is_empty() {
            return Err("demo files list cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn layout(&self) -> crate::Result<Layout> {
        Ok(Layout::new(self.grid.rows, self.grid.columns)?)
    }

    pub async fn from_file(path: &Path) -> crate::Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::StreamGridError::ConfigError(format!(
                "Failed to read configuration file {:?}: {}",
                path, e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            crate::StreamGridError::ConfigError(format!(
                "Failed to parse configuration file {:?}: {}",
                path, e
            ))
        })?;

        config.validate().map_err(crate::StreamGridError::ConfigError)?;
        Ok(config)
    }

    /// Load `path`, or fall back to the defaults when it does not exist.
    pub async fn load_or_default(path: &Path) -> crate::Result<Self> {
        if tokio::fs::try_exists(path).await? {
            info!("Loading configuration from {:?}", path);
            Self::from_file(path).await
        } else {
            warn!("Configuration file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}
