//! Configuration management for the governance classifier

use crate::error::Result;
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log output format
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory that relative paths are resolved against
    #[serde(skip, default = "project_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data and model locations, relative to the project root
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_train_data")]
    pub train_data: String,
    #[serde(default = "default_test_data")]
    pub test_data: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_train_data() -> String {
    "Data/traindata.csv".to_string()
}

fn default_test_data() -> String {
    "Data/testdata.csv".to_string()
}

fn default_model() -> String {
    "Model/GovernanceModel.json".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            train_data: default_train_data(),
            test_data: default_test_data(),
            model: default_model(),
        }
    }
}

/// Feature pipeline switches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Scale the feature vector by its per-feature maximum magnitude
    #[serde(default)]
    pub normalize_features: bool,
    /// Append the one-hot tenant encoding to the classifier features.
    /// When false the encoding is still computed but not consumed.
    #[serde(default)]
    pub include_tenant_features: bool,
}

/// Classifier training parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Seed for the row shuffling RNG
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_l2_regularization")]
    pub l2_regularization: f64,
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Number of rows logged at debug level before fitting
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_l2_regularization() -> f64 {
    1e-4
}

fn default_max_epochs() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_preview_rows() -> usize {
    10
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            learning_rate: default_learning_rate(),
            l2_regularization: default_l2_regularization(),
            max_epochs: default_max_epochs(),
            tolerance: default_tolerance(),
            preview_rows: default_preview_rows(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

/// Root of the crate checkout, where `Data/`, `Model/` and `config/` live
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

impl AppConfig {
    /// Load `config/config.toml` under the project root, or the defaults
    /// when that file does not exist.
    pub fn load() -> Result<Self> {
        let root = project_root();
        let path = root.join("config").join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Resolve relative paths against another directory
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    pub fn train_data_path(&self) -> PathBuf {
        self.root.join(&self.paths.train_data)
    }

    pub fn test_data_path(&self) -> PathBuf {
        self.root.join(&self.paths.test_data)
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join(&self.paths.model)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: project_root(),
            paths: PathsConfig::default(),
            pipeline: PipelineConfig::default(),
            training: TrainingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.training.seed, 0);
        assert_eq!(config.training.max_epochs, 200);
        assert!(!config.pipeline.include_tenant_features);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.model_path().ends_with("Model/GovernanceModel.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[training]\nseed = 7\n\n[pipeline]\ninclude_tenant_features = true\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.learning_rate, 0.1);
        assert!(config.pipeline.include_tenant_features);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.paths.test_data, "Data/testdata.csv");
    }

    #[test]
    fn test_with_root() {
        let config = AppConfig::default().with_root("/srv/governance");
        assert_eq!(
            config.train_data_path(),
            PathBuf::from("/srv/governance/Data/traindata.csv")
        );
    }
}
