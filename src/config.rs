//! Configuration for touch gesture feature extraction.

use crate::core::OutputFormat;
use crate::model::MIN_GESTURES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main configuration for extraction and scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time tolerance around each gesture, in milliseconds
    #[serde(rename = "padding")]
    pub padding_ms: u32,

    /// Drop repeated samples before segmentation
    pub dedup_samples: bool,

    /// Format for exported feature tables
    pub output_format: OutputFormat,

    /// Directory for exported feature tables and score reports
    pub export_path: PathBuf,

    /// Directory for run statistics
    pub data_path: PathBuf,

    /// Normalization parameters for scoring
    pub scaler_path: PathBuf,

    /// Boundary-model parameters for scoring
    pub model_path: PathBuf,

    /// Fewest scored gestures before an owner verdict is given
    pub min_gestures: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("touch-gesture-features");
        let model_dir = data_dir.join("model");

        Self {
            padding_ms: 0,
            dedup_samples: false,
            output_format: OutputFormat::Csv,
            export_path: data_dir.join("exports"),
            scaler_path: model_dir.join("scaler_params.json"),
            model_path: model_dir.join("ocsvm_params.json"),
            data_path: data_dir,
            min_gestures: MIN_GESTURES,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("touch-gesture-features")
            .join("config.json")
    }

    /// Path of the cumulative run statistics file.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("extraction_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
