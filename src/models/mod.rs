//! Model persistence and inference components

pub mod inference;
pub mod loader;

pub use inference::{PredictionEngine, Predictor};
pub use loader::{ModelArtifact, ModelLoader};
