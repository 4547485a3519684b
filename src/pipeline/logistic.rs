//! L2-regularized logistic regression trained with stochastic gradient
//! descent. Rows are visited in a shuffled order each epoch, drawn from an
//! RNG seeded by the caller, so a given seed always yields the same model.

use crate::error::{GovernanceError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionOptions {
    pub label_column: String,
    pub feature_column: String,
    /// Initial step size
    pub learning_rate: f64,
    pub l2_regularization: f64,
    pub max_epochs: usize,
    /// Relative change of the objective below which training stops
    pub tolerance: f64,
    pub seed: u64,
}

/// Learned weights of a linear classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearModel {
    /// Raw decision function `w·x + b`
    pub fn score(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Logistic loss of score `z` against label `y`
fn log_loss(z: f64, y: f64) -> f64 {
    z.max(0.0) - z * y + (-z.abs()).exp().ln_1p()
}

fn objective(model: &LinearModel, rows: &[Vec<f64>], targets: &[f64], l2: f64) -> f64 {
    let data_loss = rows
        .iter()
        .zip(targets)
        .map(|(x, &y)| log_loss(model.score(x), y))
        .sum::<f64>()
        / rows.len() as f64;
    let penalty = 0.5 * l2 * model.weights.iter().map(|w| w * w).sum::<f64>();
    data_loss + penalty
}

/// Fit a linear model to `rows` and `labels`.
///
/// Fails when there are no rows, when only one label value is present, or
/// when the objective stops being finite.
pub fn train(
    options: &LogisticRegressionOptions,
    rows: &[Vec<f64>],
    labels: &[bool],
) -> Result<LinearModel> {
    if rows.is_empty() {
        return Err(GovernanceError::Training(
            "training set has no rows".to_string(),
        ));
    }
    if rows.len() != labels.len() {
        return Err(GovernanceError::Training(format!(
            "{} feature rows but {} labels",
            rows.len(),
            labels.len()
        )));
    }

    let positives = labels.iter().filter(|&&l| l).count();
    if positives == 0 || positives == labels.len() {
        return Err(GovernanceError::Training(format!(
            "label column '{}' has a single distinct value",
            options.label_column
        )));
    }

    let width = rows[0].len();
    if let Some(row) = rows.iter().position(|r| r.len() != width) {
        return Err(GovernanceError::Training(format!(
            "feature row {} has {} values, expected {}",
            row + 1,
            rows[row].len(),
            width
        )));
    }

    let targets: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
    let l2 = options.l2_regularization;
    let eta0 = options.learning_rate;

    let mut model = LinearModel {
        weights: vec![0.0; width],
        bias: 0.0,
    };
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let mut previous = objective(&model, rows, &targets, l2);
    let mut step = 0u64;
    let mut converged = false;
    let mut epochs = 0;

    for epoch in 1..=options.max_epochs {
        order.shuffle(&mut rng);

        for &i in &order {
            step += 1;
            let eta = eta0 / (1.0 + eta0 * l2 * step as f64);
            let gradient = sigmoid(model.score(&rows[i])) - targets[i];

            for (w, x) in model.weights.iter_mut().zip(&rows[i]) {
                *w -= eta * (gradient * x + l2 * *w);
            }
            model.bias -= eta * gradient;
        }

        epochs = epoch;
        let current = objective(&model, rows, &targets, l2);
        if !current.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
            return Err(GovernanceError::Training(format!(
                "optimizer diverged at epoch {epoch}"
            )));
        }

        let change = (previous - current).abs() / previous.abs().max(f64::EPSILON);
        debug!(epoch, loss = current, change, "Epoch complete");
        previous = current;

        if change < options.tolerance {
            converged = true;
            break;
        }
    }

    if converged {
        info!(epochs, loss = previous, "Logistic regression converged");
    } else {
        warn!(
            epochs,
            loss = previous,
            tolerance = options.tolerance,
            "Logistic regression stopped at epoch limit before reaching tolerance"
        );
    }

    Ok(model)
}
