//! Held-out evaluation of a fitted pipeline

use crate::dataset::Dataset;
use crate::error::{GovernanceError, Result};
use crate::metrics::BinaryClassificationMetrics;
use crate::pipeline::FittedPipeline;
use crate::schema::DataSchema;
use std::path::Path;
use tracing::info;

/// Scores labeled data with a fitted pipeline and measures the result.
/// The pipeline is never refit.
pub struct Evaluator<'a> {
    pipeline: &'a FittedPipeline,
    schema: &'a DataSchema,
}

impl<'a> Evaluator<'a> {
    /// `schema` is the layout the pipeline was trained on
    pub fn new(pipeline: &'a FittedPipeline, schema: &'a DataSchema) -> Self {
        Self { pipeline, schema }
    }

    /// Load a labeled file and evaluate on it.
    ///
    /// A header that differs from the training layout is a
    /// `SchemaMismatch`; everything else wrong with the file is `DataFormat`.
    pub fn evaluate_file<P: AsRef<Path>>(&self, path: P) -> Result<BinaryClassificationMetrics> {
        let dataset = Dataset::load(path, self.schema)?;
        self.evaluate(&dataset)
    }

    pub fn evaluate(&self, dataset: &Dataset) -> Result<BinaryClassificationMetrics> {
        let labels = dataset.labels()?;
        let predictions = self.pipeline.transform_dataset(dataset);
        let pairs: Vec<_> = predictions.iter().zip(labels).collect();

        let metrics = BinaryClassificationMetrics::compute(&pairs).ok_or_else(|| {
            GovernanceError::data_format(dataset.source(), None, "no rows to evaluate")
        })?;

        info!(
            path = %dataset.source().display(),
            rows = dataset.len(),
            accuracy = metrics.accuracy,
            f1_score = metrics.f1_score,
            "Evaluation complete"
        );

        Ok(metrics)
    }
}
