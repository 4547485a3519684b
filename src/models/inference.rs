//! Prediction with a persisted governance model

use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::loader::{ModelArtifact, ModelLoader};
use crate::pipeline::fitted::RowColumns;
use crate::pipeline::FittedPipeline;
use crate::schema::DataSchema;
use crate::types::{GovernancePrediction, GovernanceRecord};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// A reloaded model, shareable read-only across threads
#[derive(Debug, Clone)]
pub struct Predictor {
    pipeline: Arc<FittedPipeline>,
    schema: DataSchema,
    model_id: Option<Uuid>,
}

impl Predictor {
    /// Reload the model artifact at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ModelArtifact {
            model_id,
            schema,
            pipeline,
            ..
        } = ModelLoader::load(path)?;

        info!(
            model_id = %model_id,
            features = pipeline.feature_count(),
            "Predictor ready"
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            schema,
            model_id: Some(model_id),
        })
    }

    /// Wrap an in-memory fitted pipeline
    pub fn from_pipeline(pipeline: Arc<FittedPipeline>) -> Self {
        Self {
            pipeline,
            schema: DataSchema::governance(),
            model_id: None,
        }
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn schema(&self) -> &DataSchema {
        &self.schema
    }

    /// Identifier of the loaded artifact, `None` for in-memory pipelines
    pub fn model_id(&self) -> Option<Uuid> {
        self.model_id
    }

    /// Create a single-record prediction engine.
    ///
    /// Engines keep a scratch buffer between calls. Give each thread its
    /// own engine; the fitted parameters are shared.
    pub fn create_engine(&self) -> PredictionEngine {
        PredictionEngine {
            pipeline: Arc::clone(&self.pipeline),
            row: RowColumns::default(),
        }
    }

    /// Score records in order
    pub fn predict_batch(&self, records: &[GovernanceRecord]) -> Vec<GovernancePrediction> {
        let predictions = self.pipeline.transform(records);
        debug!(count = predictions.len(), "Batch prediction complete");
        predictions
    }

    /// Score every row of a file laid out like the training data.
    ///
    /// Labels may be left empty.
    pub fn predict_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<GovernancePrediction>> {
        let dataset = Dataset::load(path, &self.schema)?;
        Ok(self.pipeline.transform_dataset(&dataset))
    }
}

/// Scores one record at a time with a reused buffer
#[derive(Debug)]
pub struct PredictionEngine {
    pipeline: Arc<FittedPipeline>,
    row: RowColumns,
}

impl PredictionEngine {
    pub fn predict(&mut self, record: &GovernanceRecord) -> GovernancePrediction {
        let (score, probability) = self.pipeline.score_into(record, &mut self.row);
        GovernancePrediction::new(record.clone(), score, probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, TrainingConfig};
    use crate::error::GovernanceError;
    use crate::pipeline::PipelineBuilder;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn fitted(include_tenant_features: bool) -> FittedPipeline {
        fitted_with(&PipelineConfig {
            normalize_features: false,
            include_tenant_features,
        })
    }

    fn fitted_with(pipeline: &PipelineConfig) -> FittedPipeline {
        let dataset = Dataset::from_records(vec![
            GovernanceRecord::with_signals("contoso", [1.0; 6]).labeled(true),
            GovernanceRecord::with_signals("fabrikam", [0.0; 6]).labeled(false),
            GovernanceRecord::with_signals("contoso", [0.9, 1.0, 0.8, 1.0, 0.7, 1.0]).labeled(true),
            GovernanceRecord::with_signals("northwind", [0.1, 0.2, 0.0, 0.3, 0.1, 0.0]).labeled(false),
        ]);
        PipelineBuilder::governance(pipeline, &TrainingConfig::default())
            .fit(&dataset)
            .unwrap()
    }

    fn inputs() -> Vec<GovernanceRecord> {
        vec![
            GovernanceRecord::with_signals("contoso", [1.0; 6]),
            GovernanceRecord::with_signals("", [0.0; 6]),
            GovernanceRecord::with_signals("unknown", [2.0; 6]),
        ]
    }

    #[test]
    fn test_batch_matches_single() {
        for include_tenant_features in [false, true] {
            let predictor = Predictor::from_pipeline(Arc::new(fitted(include_tenant_features)));
            let records = inputs();

            let batch = predictor.predict_batch(&records);
            let mut engine = predictor.create_engine();

            for (record, expected) in records.iter().zip(&batch) {
                let single = engine.predict(record);
                assert_eq!(&single, expected);
                assert_eq!(single.score.to_bits(), expected.score.to_bits());
            }
        }
    }

    #[test]
    fn test_repeated_predictions_identical() {
        let predictor = Predictor::from_pipeline(Arc::new(fitted(true)));
        let mut engine = predictor.create_engine();
        let record = GovernanceRecord::with_signals("contoso", [0.4, 0.6, 0.5, 0.2, 0.9, 0.1]);

        let first = engine.predict(&record);
        engine.predict(&GovernanceRecord::with_signals("fabrikam", [3.0; 6]));
        let second = engine.predict(&record);

        assert_eq!(first, second);
    }

    #[test]
    fn test_reloaded_predictions_match_in_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GovernanceModel.json");

        for (normalize_features, include_tenant_features) in
            [(false, false), (true, false), (false, true), (true, true)]
        {
            let pipeline = fitted_with(&PipelineConfig {
                normalize_features,
                include_tenant_features,
            });
            ModelLoader::save(
                &ModelArtifact::new(pipeline.clone(), DataSchema::governance()),
                &path,
            )
            .unwrap();

            let reloaded = Predictor::load(&path).unwrap();
            assert!(reloaded.model_id().is_some());
            assert_eq!(reloaded.pipeline(), &pipeline);

            let in_memory = pipeline.transform(&inputs());
            let persisted = reloaded.predict_batch(&inputs());
            assert_eq!(persisted, in_memory);
            for (a, b) in persisted.iter().zip(&in_memory) {
                assert_eq!(a.score.to_bits(), b.score.to_bits());
            }
        }
    }

    #[test]
    fn test_missing_model_fails() {
        let dir = tempdir().unwrap();
        let err = Predictor::load(dir.path().join("Model/GovernanceModel.json")).unwrap_err();
        assert!(matches!(err, GovernanceError::ModelLoad { .. }));
    }

    #[test]
    fn test_predict_file_without_labels() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Tenant,Track,Age,Security,Activity,Protection,Usage,Change,GoodBad,Description\n\
             contoso,Security,1,1,1,1,1,1,,\n\
             fabrikam,Usage,0,0,0,0,0,0,,"
        )
        .unwrap();

        let predictor = Predictor::from_pipeline(Arc::new(fitted(false)));
        let predictions = predictor.predict_file(file.path()).unwrap();

        assert_eq!(predictions.len(), 2);
        assert!(predictions[0].predicted_label);
        assert!(!predictions[1].predicted_label);
        assert_eq!(predictions[0].record.label, None);
    }

    #[test]
    fn test_predict_file_schema_mismatch() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Tenant,Track,Age,Security,Activity,Protection,Usage,Change,Adoption,Result,Description"
        )
        .unwrap();

        let predictor = Predictor::from_pipeline(Arc::new(fitted(false)));
        let err = predictor.predict_file(file.path()).unwrap_err();
        assert!(matches!(err, GovernanceError::SchemaMismatch { .. }));
    }
}
