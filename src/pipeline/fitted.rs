//! A pipeline whose stages have learned their parameters

use super::encoder::{MinMaxScaler, OneHotEncoder};
use super::logistic::{sigmoid, LinearModel, LogisticRegressionOptions};
use crate::dataset::Dataset;
use crate::feature_extractor::{FeatureExtractor, FEATURE_COLUMNS};
use crate::types::{GovernancePrediction, GovernanceRecord};
use serde::{Deserialize, Serialize};

/// Working columns of one row while it flows through the transforms
#[derive(Debug, Default, Clone)]
pub struct RowColumns {
    pub features: Vec<f64>,
    pub encoded: Vec<f64>,
}

impl RowColumns {
    pub fn clear(&mut self) {
        self.features.clear();
        self.encoded.clear();
    }
}

/// A fitted column transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum FittedTransform {
    Concatenate {
        output: String,
        extractor: FeatureExtractor,
    },
    NormalizeMinMax {
        column: String,
        scaler: MinMaxScaler,
    },
    OneHotEncoding {
        encoder: OneHotEncoder,
    },
    /// Append an encoded categorical column to the feature vector
    AppendEncoded {
        output: String,
        input: String,
    },
}

impl FittedTransform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concatenate { .. } => "concatenate",
            Self::NormalizeMinMax { .. } => "normalize_min_max",
            Self::OneHotEncoding { .. } => "one_hot_encoding",
            Self::AppendEncoded { .. } => "append_encoded",
        }
    }

    pub fn apply(&self, record: &GovernanceRecord, row: &mut RowColumns) {
        match self {
            Self::Concatenate { extractor, .. } => {
                row.features.clear();
                extractor.extract_into(record, &mut row.features);
            }
            Self::NormalizeMinMax { scaler, .. } => scaler.apply(&mut row.features),
            Self::OneHotEncoding { encoder } => {
                row.encoded.clear();
                let value = record.text(&encoder.input).unwrap_or_default();
                encoder.encode_into(value, &mut row.encoded);
            }
            Self::AppendEncoded { .. } => {
                let RowColumns { features, encoded } = row;
                features.extend_from_slice(encoded);
            }
        }
    }
}

/// The trained classifier stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClassifier {
    pub options: LogisticRegressionOptions,
    pub model: LinearModel,
}

/// Transform chain plus trained classifier.
///
/// Scoring is a pure function of the fitted parameters and the record:
/// every entry point goes through [`FittedPipeline::score_into`], so single
/// record, batch and reloaded scoring produce the same bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    transforms: Vec<FittedTransform>,
    classifier: FittedClassifier,
}

impl FittedPipeline {
    pub(crate) fn new(transforms: Vec<FittedTransform>, classifier: FittedClassifier) -> Self {
        Self {
            transforms,
            classifier,
        }
    }

    pub fn transforms(&self) -> &[FittedTransform] {
        &self.transforms
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }

    /// Width of the vector the classifier consumes
    pub fn feature_count(&self) -> usize {
        self.classifier.model.weights.len()
    }

    /// The tenant encoder, if the pipeline has one
    pub fn tenant_encoder(&self) -> Option<&OneHotEncoder> {
        self.transforms.iter().find_map(|t| match t {
            FittedTransform::OneHotEncoding { encoder } => Some(encoder),
            _ => None,
        })
    }

    /// Whether the encoded tenant column reaches the classifier
    pub fn uses_tenant_features(&self) -> bool {
        self.transforms
            .iter()
            .any(|t| matches!(t, FittedTransform::AppendEncoded { .. }))
    }

    /// One-hot encoding of a tenant as produced by the pipeline
    pub fn encode_tenant(&self, tenant: &str) -> Option<Vec<f32>> {
        self.tenant_encoder().map(|e| e.encode(tenant))
    }

    /// Check that the fitted parameters fit together: the classifier must
    /// consume exactly the vector the transforms produce, and every learned
    /// value must be finite.
    pub fn validate(&self) -> Result<(), String> {
        let mut width = 0;
        let mut encoded = None;

        for transform in &self.transforms {
            match transform {
                FittedTransform::Concatenate { extractor, .. } => {
                    if let Some(name) = extractor
                        .feature_names()
                        .into_iter()
                        .find(|name| !FEATURE_COLUMNS.contains(name))
                    {
                        return Err(format!("'{name}' is not a numeric column"));
                    }
                    width = extractor.feature_count();
                }
                FittedTransform::NormalizeMinMax { column, scaler } => {
                    let scales = scaler.scales();
                    if scales.len() != width {
                        return Err(format!(
                            "scaler of '{column}' has {} scales for {width} features",
                            scales.len()
                        ));
                    }
                    if scales.iter().any(|s| !s.is_finite()) {
                        return Err(format!("scaler of '{column}' has a non-finite scale"));
                    }
                }
                FittedTransform::OneHotEncoding { encoder } => {
                    encoder.validate()?;
                    encoded = Some(encoder.len());
                }
                FittedTransform::AppendEncoded { input, .. } => {
                    width += encoded
                        .ok_or_else(|| format!("'{input}' is appended before it is encoded"))?;
                }
            }
        }

        let model = &self.classifier.model;
        if model.weights.len() != width {
            return Err(format!(
                "classifier has {} weights for {width} features",
                model.weights.len()
            ));
        }
        if !model.bias.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
            return Err("classifier has non-finite weights".to_string());
        }

        Ok(())
    }

    /// Run all transforms on `record` into `row`, returning `(score, probability)`.
    pub fn score_into(&self, record: &GovernanceRecord, row: &mut RowColumns) -> (f32, f32) {
        row.clear();
        for transform in &self.transforms {
            transform.apply(record, row);
        }

        let score = self.classifier.model.score(&row.features);
        (score as f32, sigmoid(score) as f32)
    }

    /// Score a single record
    pub fn predict(&self, record: &GovernanceRecord) -> GovernancePrediction {
        let mut row = RowColumns::default();
        let (score, probability) = self.score_into(record, &mut row);
        GovernancePrediction::new(record.clone(), score, probability)
    }

    /// Score records in order
    pub fn transform(&self, records: &[GovernanceRecord]) -> Vec<GovernancePrediction> {
        let mut row = RowColumns::default();
        records
            .iter()
            .map(|record| {
                let (score, probability) = self.score_into(record, &mut row);
                GovernancePrediction::new(record.clone(), score, probability)
            })
            .collect()
    }

    pub fn transform_dataset(&self, dataset: &Dataset) -> Vec<GovernancePrediction> {
        self.transform(dataset.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, TrainingConfig};
    use crate::pipeline::PipelineBuilder;

    fn fitted(pipeline: &PipelineConfig) -> FittedPipeline {
        let dataset = Dataset::from_records(vec![
            GovernanceRecord::with_signals("contoso", [2.0; 6]).labeled(true),
            GovernanceRecord::with_signals("fabrikam", [0.0; 6]).labeled(false),
        ]);
        PipelineBuilder::governance(pipeline, &TrainingConfig::default())
            .fit(&dataset)
            .unwrap()
    }

    #[test]
    fn test_fitted_pipelines_are_consistent() {
        for (normalize_features, include_tenant_features) in
            [(false, false), (true, false), (false, true), (true, true)]
        {
            let pipeline = fitted(&PipelineConfig {
                normalize_features,
                include_tenant_features,
            });
            assert_eq!(pipeline.validate(), Ok(()));
        }
    }

    #[test]
    fn test_weight_count_mismatch() {
        let mut pipeline = fitted(&PipelineConfig::default());
        pipeline.classifier.model.weights = vec![0.5];
        assert!(pipeline.validate().unwrap_err().contains("1 weights for 6 features"));

        let mut pipeline = fitted(&PipelineConfig {
            normalize_features: false,
            include_tenant_features: true,
        });
        pipeline.classifier.model.weights.pop();
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn test_non_finite_bias() {
        let mut pipeline = fitted(&PipelineConfig::default());
        pipeline.classifier.model.bias = f64::NAN;
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn test_scaler_width_mismatch() {
        let mut pipeline = fitted(&PipelineConfig {
            normalize_features: true,
            include_tenant_features: false,
        });
        pipeline.transforms[1] = FittedTransform::NormalizeMinMax {
            column: "FeatureVector".to_string(),
            scaler: MinMaxScaler::fit([[1.0, 2.0].as_slice()], 2),
        };
        assert!(pipeline.validate().unwrap_err().contains("2 scales for 6 features"));
    }

    #[test]
    fn test_append_before_encoding() {
        let mut pipeline = fitted(&PipelineConfig::default());
        pipeline.transforms.retain(|t| !matches!(t, FittedTransform::OneHotEncoding { .. }));
        pipeline.transforms.push(FittedTransform::AppendEncoded {
            output: "FeatureVector".to_string(),
            input: "TenantOneHot".to_string(),
        });
        assert!(pipeline.validate().is_err());
    }
}
