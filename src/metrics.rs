//! Quality metrics for binary classification.

use crate::types::GovernancePrediction;
use serde::Serialize;
use tracing::info;

/// Counts of predicted against actual labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn correct(&self) -> u64 {
        self.true_positives + self.true_negatives
    }
}

/// Binary classification quality, positive class = label `true`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryClassificationMetrics {
    pub accuracy: f64,
    pub f1_score: f64,
    pub positive_precision: f64,
    pub positive_recall: f64,
    pub negative_precision: f64,
    pub negative_recall: f64,
    /// Area under the ROC curve; `None` when one class is absent
    pub auc: Option<f64>,
    /// Mean negative log-likelihood of the true labels
    pub log_loss: f64,
    pub confusion: ConfusionMatrix,
}

const PROBABILITY_EPSILON: f64 = 1e-15;

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl BinaryClassificationMetrics {
    /// Compute metrics from predictions and their true labels.
    ///
    /// Returns `None` when `pairs` is empty.
    pub fn compute(pairs: &[(&GovernancePrediction, bool)]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }

        let mut confusion = ConfusionMatrix::default();
        let mut log_loss = 0.0;
        for (prediction, actual) in pairs {
            confusion.record(prediction.predicted_label, *actual);

            let p = (prediction.probability as f64).clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            log_loss -= if *actual { p.ln() } else { (1.0 - p).ln() };
        }
        log_loss /= pairs.len() as f64;

        let c = &confusion;
        let positive_precision = ratio(c.true_positives, c.true_positives + c.false_positives);
        let positive_recall = ratio(c.true_positives, c.true_positives + c.false_negatives);
        let f1_score = if positive_precision + positive_recall > 0.0 {
            2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
        } else {
            0.0
        };

        Some(Self {
            accuracy: ratio(c.correct(), c.total()),
            f1_score,
            positive_precision,
            positive_recall,
            negative_precision: ratio(c.true_negatives, c.true_negatives + c.false_negatives),
            negative_recall: ratio(c.true_negatives, c.true_negatives + c.false_positives),
            auc: area_under_roc(pairs),
            log_loss,
            confusion,
        })
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let c = &self.confusion;
        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║           GOVERNANCE MODEL - QUALITY METRICS                 ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Accuracy:  {:>6.2}   │  F1 Score: {:>6.2}                     ║", self.accuracy, self.f1_score);
        match self.auc {
            Some(auc) => info!("║ AUC:       {:>6.2}   │  Log-loss: {:>6.3}                     ║", auc, self.log_loss),
            None => info!("║ AUC:          n/a   │  Log-loss: {:>6.3}                     ║", self.log_loss),
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Positive precision={:>5.2} recall={:>5.2}                          ║",
            self.positive_precision, self.positive_recall
        );
        info!(
            "║ Negative precision={:>5.2} recall={:>5.2}                          ║",
            self.negative_precision, self.negative_recall
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Confusion:        predicted good  predicted bad              ║");
        info!("║   actual good     {:>14}  {:>13}              ║", c.true_positives, c.false_negatives);
        info!("║   actual bad      {:>14}  {:>13}              ║", c.false_positives, c.true_negatives);
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

/// Rank statistic form of the ROC area, averaging ranks over tied probabilities
fn area_under_roc(pairs: &[(&GovernancePrediction, bool)]) -> Option<f64> {
    let positives = pairs.iter().filter(|(_, actual)| *actual).count();
    let negatives = pairs.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut ranked: Vec<(f32, bool)> = pairs
        .iter()
        .map(|(p, actual)| (p.probability, *actual))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start;
        while end + 1 < ranked.len() && ranked[end + 1].0 == ranked[start].0 {
            end += 1;
        }
        // ranks are 1-based; tied entries share the mean rank
        let mean_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = ranked[start..=end].iter().filter(|(_, a)| *a).count();
        positive_rank_sum += mean_rank * tied_positives as f64;
        start = end + 1;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}
