//! Feature transforms and the binary classifier they feed

pub mod builder;
pub mod encoder;
pub mod fitted;
pub mod logistic;

pub use builder::{PipelineBuilder, Stage, TENANT_ONE_HOT};
pub use fitted::{FittedPipeline, FittedTransform};
pub use logistic::{LinearModel, LogisticRegressionOptions};
