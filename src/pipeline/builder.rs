//! Declarative stage list for the governance pipeline.
//!
//! Building a pipeline only records configuration. Nothing is read or
//! learned until [`PipelineBuilder::fit`] is called with a dataset.

use super::encoder::{MinMaxScaler, OneHotEncoder};
use super::fitted::{FittedClassifier, FittedPipeline, FittedTransform, RowColumns};
use super::logistic::{self, LogisticRegressionOptions};
use crate::config::{PipelineConfig, TrainingConfig};
use crate::dataset::Dataset;
use crate::error::{GovernanceError, Result};
use crate::feature_extractor::{FeatureExtractor, FEATURE_COLUMNS, FEATURE_VECTOR};
use crate::schema::columns;
use tracing::{debug, info};

/// Output column of the tenant encoder
pub const TENANT_ONE_HOT: &str = "TenantOneHot";

/// An unfitted pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Concatenate numeric columns into one vector column
    Concatenate { output: String, inputs: Vec<String> },
    NormalizeMinMax { column: String },
    OneHotEncoding { output: String, input: String },
    /// Append an encoded column onto the feature vector
    AppendEncoded { output: String, input: String },
    LogisticRegression(LogisticRegressionOptions),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Concatenate { .. } => "concatenate",
            Stage::NormalizeMinMax { .. } => "normalize_min_max",
            Stage::OneHotEncoding { .. } => "one_hot_encoding",
            Stage::AppendEncoded { .. } => "append_encoded",
            Stage::LogisticRegression(_) => "logistic_regression",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// The governance pipeline:
    /// concatenate signals, optionally normalize, one-hot encode the
    /// tenant, optionally feed that encoding to the classifier, then
    /// logistic regression on `GoodBad`.
    pub fn governance(pipeline: &PipelineConfig, training: &TrainingConfig) -> Self {
        let mut builder = Self::new().append(Stage::Concatenate {
            output: FEATURE_VECTOR.to_string(),
            inputs: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        });

        if pipeline.normalize_features {
            builder = builder.append(Stage::NormalizeMinMax {
                column: FEATURE_VECTOR.to_string(),
            });
        }

        builder = builder.append(Stage::OneHotEncoding {
            output: TENANT_ONE_HOT.to_string(),
            input: columns::TENANT.to_string(),
        });

        if pipeline.include_tenant_features {
            builder = builder.append(Stage::AppendEncoded {
                output: FEATURE_VECTOR.to_string(),
                input: TENANT_ONE_HOT.to_string(),
            });
        }

        builder.append(Stage::LogisticRegression(LogisticRegressionOptions {
            label_column: columns::LABEL.to_string(),
            feature_column: FEATURE_VECTOR.to_string(),
            learning_rate: training.learning_rate,
            l2_regularization: training.l2_regularization,
            max_epochs: training.max_epochs,
            tolerance: training.tolerance,
            seed: training.seed,
        }))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Fit every stage in order on the output of the stages before it.
    pub fn fit(&self, dataset: &Dataset) -> Result<FittedPipeline> {
        let (classifier, transforms) = match self.stages.split_last() {
            Some((Stage::LogisticRegression(options), transforms)) => (options, transforms),
            _ => {
                return Err(GovernanceError::InvalidPipeline(
                    "pipeline must end with a classifier stage".to_string(),
                ))
            }
        };

        if dataset.is_empty() {
            return Err(GovernanceError::Training(format!(
                "{} has no rows",
                dataset.source().display()
            )));
        }

        let labels = dataset.labels()?;
        let records = dataset.records();
        let mut rows = vec![RowColumns::default(); records.len()];
        let mut fitted = Vec::with_capacity(transforms.len());

        for stage in transforms {
            let transform = fit_transform(stage, dataset, &rows)?;
            for (row, record) in rows.iter_mut().zip(records) {
                transform.apply(record, row);
            }
            debug!(stage = transform.name(), "Stage fitted");
            fitted.push(transform);
        }

        let features: Vec<Vec<f64>> = rows.into_iter().map(|r| r.features).collect();
        if features.first().map_or(true, Vec::is_empty) {
            return Err(GovernanceError::InvalidPipeline(format!(
                "column '{}' is empty when the classifier runs",
                classifier.feature_column
            )));
        }

        let model = logistic::train(classifier, &features, &labels)?;

        info!(
            stages = self.stages.len(),
            features = model.weights.len(),
            rows = records.len(),
            "Pipeline fitted"
        );

        Ok(FittedPipeline::new(
            fitted,
            FittedClassifier {
                options: classifier.clone(),
                model,
            },
        ))
    }
}

fn fit_transform(stage: &Stage, dataset: &Dataset, rows: &[RowColumns]) -> Result<FittedTransform> {
    let transform = match stage {
        Stage::Concatenate { output, inputs } => FittedTransform::Concatenate {
            output: output.clone(),
            extractor: FeatureExtractor::with_columns(inputs.as_slice()).map_err(|name| {
                GovernanceError::InvalidPipeline(format!("'{name}' is not a numeric column"))
            })?,
        },
        Stage::NormalizeMinMax { column } => {
            let width = rows.first().map_or(0, |r| r.features.len());
            FittedTransform::NormalizeMinMax {
                column: column.clone(),
                scaler: MinMaxScaler::fit(rows.iter().map(|r| r.features.as_slice()), width),
            }
        }
        Stage::OneHotEncoding { output, input } => {
            if input != columns::TENANT && input != columns::TRACK {
                return Err(GovernanceError::InvalidPipeline(format!(
                    "'{input}' is not a categorical column"
                )));
            }
            let values = dataset
                .records()
                .iter()
                .filter_map(|r| r.text(input));
            FittedTransform::OneHotEncoding {
                encoder: OneHotEncoder::fit(input, output, values),
            }
        }
        Stage::AppendEncoded { output, input } => FittedTransform::AppendEncoded {
            output: output.clone(),
            input: input.clone(),
        },
        Stage::LogisticRegression(_) => {
            return Err(GovernanceError::InvalidPipeline(
                "classifier must be the last stage".to_string(),
            ))
        }
    };

    Ok(transform)
}
