//! Fits the governance pipeline and persists the result

use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::error::{GovernanceError, Result};
use crate::models::loader::{ModelArtifact, ModelLoader};
use crate::pipeline::{FittedPipeline, PipelineBuilder};
use crate::schema::DataSchema;
use std::path::Path;
use tracing::info;

pub struct Trainer {
    builder: PipelineBuilder,
    schema: DataSchema,
    preview_rows: usize,
}

impl Trainer {
    /// Trainer for the governance pipeline described by `config`
    pub fn new(config: &AppConfig) -> Self {
        Self {
            builder: PipelineBuilder::governance(&config.pipeline, &config.training),
            schema: DataSchema::governance(),
            preview_rows: config.training.preview_rows,
        }
    }

    /// Trainer for a custom stage list
    pub fn with_builder(builder: PipelineBuilder) -> Self {
        Self {
            builder,
            schema: DataSchema::governance(),
            preview_rows: 0,
        }
    }

    pub fn builder(&self) -> &PipelineBuilder {
        &self.builder
    }

    /// Load training data. Header mismatches count as malformed input.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        Dataset::load(path, &self.schema).map_err(GovernanceError::into_data_format)
    }

    /// Fit the pipeline on the whole dataset in one pass
    pub fn fit(&self, dataset: &Dataset) -> Result<FittedPipeline> {
        dataset.preview(self.preview_rows);
        self.builder.fit(dataset)
    }

    pub fn train_file<P: AsRef<Path>>(&self, path: P) -> Result<FittedPipeline> {
        let dataset = self.load(path)?;
        self.fit(&dataset)
    }

    /// Train on `data_path` and write the model with its input schema to
    /// `model_path`, replacing any earlier model. Nothing is written unless
    /// loading and fitting both succeed.
    pub fn train_and_save<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        data_path: P,
        model_path: Q,
    ) -> Result<ModelArtifact> {
        let pipeline = self.train_file(data_path.as_ref())?;
        let artifact = ModelArtifact::new(pipeline, self.schema.clone());

        ModelLoader::save(&artifact, model_path.as_ref())?;

        info!(
            model_id = %artifact.model_id,
            data = %data_path.as_ref().display(),
            model = %model_path.as_ref().display(),
            "Model trained and saved"
        );

        Ok(artifact)
    }
}
