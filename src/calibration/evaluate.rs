//! Walk-forward evaluation on the test split

use crate::calibration::metrics::EvaluationReport;
use crate::error::{ForecastError, Result};
use crate::rating::model::EloModel;
use crate::types::{MatchRecord, Outcome, OutcomeProbabilities};
use tracing::info;

/// Predict each test match, then learn from its result before the next one
///
/// The model keeps the test-period updates, so after evaluation it reflects
/// every match it has seen.
pub fn evaluate_walk_forward(
    model: &mut EloModel,
    test_matches: &[MatchRecord],
) -> Result<EvaluationReport> {
    if test_matches.is_empty() {
        return Err(ForecastError::invalid_input("test set is empty").into());
    }

    let mut predictions: Vec<OutcomeProbabilities> = Vec::with_capacity(test_matches.len());
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(test_matches.len());

    for record in test_matches {
        predictions.push(model.predict(&record.home, &record.away).probabilities());
        outcomes.push(record.outcome());
        model.update(
            &record.home,
            &record.away,
            record.home_goals,
            record.away_goals,
        );
    }

    let report = EvaluationReport::from_predictions(&predictions, &outcomes)?;
    info!(
        "Evaluated {} matches: score={:.5} log_loss={:.5} accuracy={:.3}",
        test_matches.len(),
        report.test_score,
        report.test_log_loss,
        report.accuracy
    );
    Ok(report)
}
