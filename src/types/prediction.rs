//! Classifier output attached to the record it was computed for

use super::record::GovernanceRecord;
use serde::{Deserialize, Serialize};

/// A scored governance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernancePrediction {
    /// The input record, unchanged
    pub record: GovernanceRecord,
    /// `true` when the score is positive
    pub predicted_label: bool,
    /// Calibrated probability of the positive class, in [0, 1]
    pub probability: f32,
    /// Raw decision function output
    pub score: f32,
}

impl GovernancePrediction {
    pub fn new(record: GovernanceRecord, score: f32, probability: f32) -> Self {
        Self {
            record,
            predicted_label: score > 0.0,
            probability,
            score,
        }
    }

    /// Whether the prediction agrees with the record's label, if it has one
    pub fn is_correct(&self) -> Option<bool> {
        self.record.label.map(|label| label == self.predicted_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicted_label_follows_score_sign() {
        let record = GovernanceRecord::with_signals("t", [0.0; 6]);

        let positive = GovernancePrediction::new(record.clone(), 0.3, 0.57);
        assert!(positive.predicted_label);

        let negative = GovernancePrediction::new(record.clone(), -0.3, 0.43);
        assert!(!negative.predicted_label);

        let zero = GovernancePrediction::new(record, 0.0, 0.5);
        assert!(!zero.predicted_label);
    }

    #[test]
    fn test_is_correct() {
        let record = GovernanceRecord::with_signals("t", [1.0; 6]);
        let unlabeled = GovernancePrediction::new(record.clone(), 1.0, 0.73);
        assert_eq!(unlabeled.is_correct(), None);

        let labeled = GovernancePrediction::new(record.labeled(false), 1.0, 0.73);
        assert_eq!(labeled.is_correct(), Some(false));
    }
}
