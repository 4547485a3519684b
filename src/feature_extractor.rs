//! Feature extraction for the governance classifier.
//!
//! Concatenates numeric signals of a record into the `FeatureVector`
//! column consumed by the classifier.

use crate::schema::columns;
use crate::types::GovernanceRecord;
use serde::{Deserialize, Serialize};

/// Name of the concatenated feature column
pub const FEATURE_VECTOR: &str = "FeatureVector";

/// Input columns in the order they appear in the feature vector
pub const FEATURE_COLUMNS: [&str; 6] = [
    columns::AGE,
    columns::SECURITY,
    columns::ACTIVITY,
    columns::PROTECTION,
    columns::USAGE,
    columns::CHANGE,
];

/// Feature extractor that transforms records into model input features.
///
/// Features are extracted in the exact order of the configured columns,
/// [`FEATURE_COLUMNS`] by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureExtractor {
    columns: Vec<String>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Extractor over a custom selection of numeric columns.
    ///
    /// Returns the first name that is not a numeric signal as the error.
    pub fn with_columns<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !FEATURE_COLUMNS.contains(&name) {
                return Err(name.to_string());
            }
            columns.push(name.to_string());
        }
        Ok(Self { columns })
    }

    /// Extract the feature vector of a record.
    pub fn extract(&self, record: &GovernanceRecord) -> Vec<f32> {
        self.columns
            .iter()
            .filter_map(|c| record.signal(c))
            .collect()
    }

    /// Append the features of a record to `out`, widened for scoring.
    pub fn extract_into(&self, record: &GovernanceRecord, out: &mut Vec<f64>) {
        out.extend(
            self.columns
                .iter()
                .filter_map(|c| record.signal(c))
                .map(f64::from),
        );
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_extraction_order() {
        let extractor = FeatureExtractor::new();
        let record = GovernanceRecord::with_signals("contoso", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let features = extractor.extract(&record);

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_extract_into_appends() {
        let extractor = FeatureExtractor::new();
        let record = GovernanceRecord::with_signals("contoso", [0.5; 6]);

        let mut buffer = vec![9.0];
        extractor.extract_into(&record, &mut buffer);

        assert_eq!(buffer.len(), 7);
        assert_eq!(buffer[1], 0.5);
    }

    #[test]
    fn test_custom_columns() {
        let extractor = FeatureExtractor::with_columns(&["Usage", "Age"]).unwrap();
        let record = GovernanceRecord::with_signals("contoso", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(extractor.extract(&record), vec![5.0, 1.0]);

        assert_eq!(
            FeatureExtractor::with_columns(&["Age", "Tenant"]).unwrap_err(),
            "Tenant"
        );
    }

    #[test]
    fn test_feature_names() {
        let extractor = FeatureExtractor::new();
        assert_eq!(
            extractor.feature_names(),
            vec!["Age", "Security", "Activity", "Protection", "Usage", "Change"]
        );
    }
}
