//! Error taxonomy for loading, training, evaluating and serving the model

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GovernanceError>;

#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Input file missing, unreadable or a row that does not fit the layout
    #[error("data format error in {}{}: {message}", .path.display(), row_suffix(.row))]
    DataFormat {
        path: PathBuf,
        row: Option<usize>,
        message: String,
    },

    /// File columns do not match the schema the model was trained with
    #[error("schema mismatch in {}: {message}", .path.display())]
    SchemaMismatch { path: PathBuf, message: String },

    /// Stage list that cannot be fitted
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Degenerate training set or a diverging optimizer
    #[error("training failed: {0}")]
    Training(String),

    /// Persisted model artifact missing, corrupt or incompatible
    #[error("failed to load model from {}: {message}", .path.display())]
    ModelLoad { path: PathBuf, message: String },

    #[error("failed to persist model to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" (row {})", r)).unwrap_or_default()
}

impl GovernanceError {
    pub fn data_format(path: &Path, row: Option<usize>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.to_path_buf(),
            row,
            message: message.into(),
        }
    }

    pub fn schema_mismatch(path: &Path, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn model_load(path: &Path, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Reinterpret a header mismatch as a malformed input file.
    ///
    /// Training has no model schema to compare against, so a wrong header
    /// there is a formatting problem of the file itself.
    pub fn into_data_format(self) -> Self {
        match self {
            Self::SchemaMismatch { path, message } => Self::DataFormat {
                path,
                row: None,
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_message_includes_row() {
        let err = GovernanceError::data_format(Path::new("Data/train.csv"), Some(4), "bad value");
        assert_eq!(
            err.to_string(),
            "data format error in Data/train.csv (row 4): bad value"
        );
    }

    #[test]
    fn test_schema_mismatch_becomes_data_format() {
        let err = GovernanceError::schema_mismatch(Path::new("a.csv"), "header differs");
        match err.into_data_format() {
            GovernanceError::DataFormat { row, message, .. } => {
                assert_eq!(row, None);
                assert_eq!(message, "header differs");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
