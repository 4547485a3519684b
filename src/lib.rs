//! Governance Classifier Library
//!
//! Trains a binary classifier over tenant governance signals, evaluates it
//! on held-out data and serves predictions from the persisted model.

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod trainer;
pub mod types;

pub use config::AppConfig;
pub use dataset::Dataset;
pub use error::{GovernanceError, Result};
pub use evaluator::Evaluator;
pub use feature_extractor::FeatureExtractor;
pub use metrics::BinaryClassificationMetrics;
pub use models::inference::{PredictionEngine, Predictor};
pub use pipeline::{FittedPipeline, PipelineBuilder};
pub use schema::DataSchema;
pub use trainer::Trainer;
pub use types::{GovernancePrediction, GovernanceRecord};
