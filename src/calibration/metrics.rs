//! Scoring rules for three-way predictions
//!
//! All functions take predictions and realized outcomes as parallel slices
//! and fail on empty or mismatched input rather than returning NaN.

use crate::error::{ForecastError, Result};
use crate::types::{Outcome, OutcomeProbabilities};
use serde::{Deserialize, Serialize};

/// Probabilities are clamped to `[EPS, 1 - EPS]` before taking logs
pub const LOG_LOSS_EPS: f64 = 1e-15;

/// Flat evaluation summary attached to a trained model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub test_score: f64,
    pub test_log_loss: f64,
    pub accuracy: f64,
}

impl EvaluationReport {
    pub fn from_predictions(predictions: &[OutcomeProbabilities], outcomes: &[Outcome]) -> Result<Self> {
        Ok(Self {
            test_score: brier_score(predictions, outcomes)?,
            test_log_loss: log_loss(predictions, outcomes)?,
            accuracy: accuracy(predictions, outcomes)?,
        })
    }
}

fn check_inputs(predictions: &[OutcomeProbabilities], outcomes: &[Outcome]) -> Result<()> {
    if predictions.is_empty() {
        return Err(ForecastError::invalid_input("no predictions to score").into());
    }
    if predictions.len() != outcomes.len() {
        return Err(ForecastError::invalid_input(format!(
            "{} predictions but {} outcomes",
            predictions.len(),
            outcomes.len()
        ))
        .into());
    }
    Ok(())
}

/// Mean squared distance to the one-hot outcome, in [0, 2]; lower is better
pub fn brier_score(predictions: &[OutcomeProbabilities], outcomes: &[Outcome]) -> Result<f64> {
    check_inputs(predictions, outcomes)?;

    let total: f64 = predictions
        .iter()
        .zip(outcomes)
        .map(|(p, outcome)| {
            p.as_array()
                .iter()
                .zip(outcome.one_hot())
                .map(|(p, y)| (p - y).powi(2))
                .sum::<f64>()
        })
        .sum();

    Ok(total / predictions.len() as f64)
}

/// Mean negative log probability assigned to the realized outcome
pub fn log_loss(predictions: &[OutcomeProbabilities], outcomes: &[Outcome]) -> Result<f64> {
    check_inputs(predictions, outcomes)?;

    let total: f64 = predictions
        .iter()
        .zip(outcomes)
        .map(|(p, outcome)| {
            -p.probability_of(*outcome)
                .clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS)
                .ln()
        })
        .sum();

    Ok(total / predictions.len() as f64)
}

/// Share of matches whose most likely outcome was the realized one
pub fn accuracy(predictions: &[OutcomeProbabilities], outcomes: &[Outcome]) -> Result<f64> {
    check_inputs(predictions, outcomes)?;

    let correct = predictions
        .iter()
        .zip(outcomes)
        .filter(|(p, outcome)| p.most_likely() == **outcome)
        .count();

    Ok(correct as f64 / predictions.len() as f64)
}
