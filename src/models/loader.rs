//! Persisted model artifacts

use crate::error::{GovernanceError, Result};
use crate::pipeline::FittedPipeline;
use crate::schema::DataSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Version of the artifact layout written by [`ModelLoader::save`]
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A fitted pipeline bundled with the schema of the data it was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub schema: DataSchema,
    pub pipeline: FittedPipeline,
}

impl ModelArtifact {
    pub fn new(pipeline: FittedPipeline, schema: DataSchema) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_id: Uuid::new_v4(),
            created_at: Utc::now(),
            schema,
            pipeline,
        }
    }
}

#[derive(Deserialize)]
struct ArtifactHeader {
    format_version: u32,
}

/// Saves and loads model artifacts
pub struct ModelLoader;

impl ModelLoader {
    /// Write an artifact, replacing any previous one at `path`.
    ///
    /// The bytes go to a sibling temp file that is renamed over `path`, so
    /// readers see either the old artifact or the complete new one.
    pub fn save<P: AsRef<Path>>(artifact: &ModelArtifact, path: P) -> Result<()> {
        let path = path.as_ref();
        let persist_err = |source: io::Error| GovernanceError::Persist {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist_err)?;
        }

        let bytes = serde_json::to_vec_pretty(artifact).map_err(|e| persist_err(e.into()))?;

        let tmp = temp_path(path);
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary model file");
            }
            return Err(persist_err(e));
        }

        info!(
            model_id = %artifact.model_id,
            path = %path.display(),
            bytes = bytes.len(),
            "Model saved"
        );

        Ok(())
    }

    /// Read an artifact, check it against the canonical schema and check
    /// that its fitted stages are consistent with each other
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => GovernanceError::model_load(path, "no model file"),
            _ => GovernanceError::model_load(path, e.to_string()),
        })?;

        let header: ArtifactHeader = serde_json::from_slice(&bytes)
            .map_err(|e| GovernanceError::model_load(path, format!("corrupt artifact: {e}")))?;
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(GovernanceError::model_load(
                path,
                format!(
                    "artifact format version {} is not supported (expected {})",
                    header.format_version, ARTIFACT_FORMAT_VERSION
                ),
            ));
        }

        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| GovernanceError::model_load(path, format!("corrupt artifact: {e}")))?;

        let expected = DataSchema::governance();
        if artifact.schema != expected {
            return Err(GovernanceError::model_load(
                path,
                format!(
                    "model was trained on schema version {} with columns [{}], expected version {} with [{}]",
                    artifact.schema.version,
                    artifact.schema.header().join(","),
                    expected.version,
                    expected.header().join(",")
                ),
            ));
        }

        artifact
            .pipeline
            .validate()
            .map_err(|e| GovernanceError::model_load(path, format!("inconsistent pipeline: {e}")))?;

        info!(
            model_id = %artifact.model_id,
            created_at = %artifact.created_at,
            path = %path.display(),
            "Model loaded"
        );

        Ok(artifact)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
