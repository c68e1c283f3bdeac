//! Exhaustive grid search over (K, home_adv, nu)
//!
//! Every grid point replays the training matches into a fresh store, predicts
//! the validation matches from the resulting ratings and is scored with the
//! Brier rule. The winner is retrained from scratch and returned.
//!
//! Tie-break policy: grid points are visited K-major, then home_adv, then nu,
//! and a later point only replaces the incumbent with a strictly lower score,
//! so the first point reaching the minimum wins. When points are scored on the
//! rayon pool the selection still happens in one serial pass over the scores
//! in grid order, so parallel and serial searches pick the same point.

use crate::calibration::metrics::brier_score;
use crate::config::{CalibrationConfig, ModelConfig};
use crate::error::{ForecastError, Result};
use crate::rating::model::EloModel;
use crate::types::{MatchRecord, Outcome, OutcomeProbabilities};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Validation score of one grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridScore {
    pub config: ModelConfig,
    pub score: f64,
}

/// Outcome of a calibration run
#[derive(Debug, Clone)]
pub struct CalibrationResult {
    /// Model retrained on the training matches with the winning configuration
    pub model: EloModel,
    pub best_config: ModelConfig,
    pub best_score: f64,
    /// Scores for every grid point, in grid order
    pub grid_scores: Vec<GridScore>,
}

/// Grid-search calibrator
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Search the grid and return the retrained winner
    ///
    /// Validation matches never update ratings during the search; each is
    /// predicted from the ratings left after the full training replay.
    pub fn train(
        &self,
        train_matches: &[MatchRecord],
        val_matches: &[MatchRecord],
    ) -> Result<CalibrationResult> {
        self.config.validate()?;

        if train_matches.is_empty() {
            return Err(ForecastError::configuration("training set is empty").into());
        }
        if val_matches.is_empty() {
            return Err(ForecastError::configuration("validation set is empty").into());
        }

        let candidates = self.config.candidates();
        let started = Instant::now();

        info!(
            "Calibrating over {} grid points ({} train, {} validation matches, parallel: {})",
            candidates.len(),
            train_matches.len(),
            val_matches.len(),
            self.config.parallel
        );

        let scores: Vec<f64> = if self.config.parallel {
            candidates
                .par_iter()
                .map(|candidate| score_candidate(*candidate, train_matches, val_matches))
                .collect::<Result<Vec<_>>>()?
        } else {
            candidates
                .iter()
                .map(|candidate| score_candidate(*candidate, train_matches, val_matches))
                .collect::<Result<Vec<_>>>()?
        };

        let grid_scores: Vec<GridScore> = candidates
            .iter()
            .zip(scores)
            .map(|(config, score)| GridScore {
                config: *config,
                score,
            })
            .collect();

        let best = select_best(&grid_scores).ok_or_else(|| {
            ForecastError::configuration("no grid point produced a finite validation score")
        })?;

        info!(
            "Best grid point K={} home_adv={} nu={} with validation score {:.5} ({:.2?})",
            best.config.k,
            best.config.home_adv,
            best.config.nu,
            best.score,
            started.elapsed()
        );

        let mut model = EloModel::new(best.config)?;
        model.replay(train_matches);

        Ok(CalibrationResult {
            model,
            best_config: best.config,
            best_score: best.score,
            grid_scores,
        })
    }
}

/// Score one configuration: replay train, predict validation, Brier
pub fn score_candidate(
    config: ModelConfig,
    train_matches: &[MatchRecord],
    val_matches: &[MatchRecord],
) -> Result<f64> {
    let mut model = EloModel::new(config)?;
    model.replay(train_matches);

    let predictions: Vec<OutcomeProbabilities> = val_matches
        .iter()
        .map(|m| model.predict(&m.home, &m.away).probabilities())
        .collect();
    let outcomes: Vec<Outcome> = val_matches.iter().map(MatchRecord::outcome).collect();

    let score = brier_score(&predictions, &outcomes)?;
    debug!(
        "K={} home_adv={} nu={} -> {:.6}",
        config.k, config.home_adv, config.nu, score
    );
    Ok(score)
}

/// First grid point with the strictly lowest score
pub fn select_best(grid_scores: &[GridScore]) -> Option<GridScore> {
    let mut best: Option<GridScore> = None;
    for candidate in grid_scores {
        let improves = match &best {
            Some(current) => candidate.score < current.score,
            None => candidate.score.is_finite(),
        };
        if improves {
            best = Some(*candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn season() -> Vec<MatchRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let scores = [
            (2, 1),
            (1, 2),
            (3, 0),
            (0, 3),
            (1, 1),
            (2, 1),
            (2, 0),
            (1, 2),
            (0, 2),
            (1, 1),
        ];
        (0..20)
            .map(|i| {
                let (home, away) = if i % 2 == 0 {
                    ("Arsenal", "Chelsea")
                } else {
                    ("Chelsea", "Arsenal")
                };
                let (hg, ag) = scores[i % scores.len()];
                MatchRecord::new(start + Duration::weeks(i as i64), home, away, hg, ag)
            })
            .collect()
    }

    fn small_grid(parallel: bool) -> CalibrationConfig {
        CalibrationConfig {
            k_values: vec![10.0, 20.0, 30.0],
            home_adv_values: vec![50.0, 100.0],
            nu_values: vec![0.1, 0.2],
            initial_rating: 1500.0,
            parallel,
        }
    }

    #[test]
    fn test_select_best_first_match_wins() {
        let scores = vec![
            GridScore {
                config: ModelConfig::new(10.0, 50.0, 0.1),
                score: 0.7,
            },
            GridScore {
                config: ModelConfig::new(20.0, 50.0, 0.1),
                score: 0.6,
            },
            GridScore {
                config: ModelConfig::new(30.0, 50.0, 0.1),
                score: 0.6,
            },
        ];
        let best = select_best(&scores).unwrap();
        assert_eq!(best.config.k, 20.0);
    }

    #[test]
    fn test_select_best_skips_nan() {
        let scores = vec![
            GridScore {
                config: ModelConfig::new(10.0, 50.0, 0.1),
                score: f64::NAN,
            },
            GridScore {
                config: ModelConfig::new(20.0, 50.0, 0.1),
                score: 0.9,
            },
        ];
        assert_eq!(select_best(&scores).unwrap().config.k, 20.0);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_train_picks_minimum_and_retrains() {
        let matches = season();
        let (train, val) = matches.split_at(14);
        let calibrator = Calibrator::new(small_grid(false));

        let result = calibrator.train(train, val).unwrap();

        assert_eq!(result.grid_scores.len(), 12);
        let min = result
            .grid_scores
            .iter()
            .map(|g| g.score)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(result.best_score, min);
        assert_eq!(result.model.config(), &result.best_config);

        // Fitted ratings come from train only
        let mut expected = EloModel::new(result.best_config).unwrap();
        expected.replay(train);
        assert_eq!(result.model, expected);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let matches = season();
        let (train, val) = matches.split_at(14);

        let serial = Calibrator::new(small_grid(false)).train(train, val).unwrap();
        let parallel = Calibrator::new(small_grid(true)).train(train, val).unwrap();

        assert_eq!(serial.best_config, parallel.best_config);
        assert_eq!(serial.best_score, parallel.best_score);
        assert_eq!(serial.grid_scores, parallel.grid_scores);
    }

    #[test]
    fn test_identical_candidates_keep_first() {
        let matches = season();
        let (train, val) = matches.split_at(14);
        // Duplicate home_adv values give two identical grid points
        let config = CalibrationConfig {
            k_values: vec![20.0],
            home_adv_values: vec![100.0, 100.0],
            nu_values: vec![0.15],
            initial_rating: 1500.0,
            parallel: false,
        };

        let result = Calibrator::new(config).train(train, val).unwrap();
        assert_eq!(result.grid_scores[0].score, result.grid_scores[1].score);
        assert_eq!(result.best_config, result.grid_scores[0].config);
    }

    #[test]
    fn test_empty_inputs_fail() {
        let matches = season();
        let calibrator = Calibrator::new(small_grid(false));

        let err = calibrator.train(&[], &matches).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ForecastError>(),
            Some(ForecastError::ConfigurationError { .. })
        ));
        assert!(calibrator.train(&matches, &[]).is_err());

        let empty_grid = Calibrator::new(CalibrationConfig {
            k_values: vec![],
            ..small_grid(false)
        });
        assert!(empty_grid.train(&matches, &matches).is_err());
    }
}
