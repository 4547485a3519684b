//! Type definitions for governance records and predictions

pub mod prediction;
pub mod record;

pub use prediction::GovernancePrediction;
pub use record::GovernanceRecord;
