//! Hyperparameter calibration and evaluation
//!
//! Grid search over the rating model's parameters, the scoring rules used to
//! compare them, and walk-forward evaluation on held-out matches.

pub mod evaluate;
pub mod grid;
pub mod metrics;

pub use evaluate::evaluate_walk_forward;
pub use grid::{CalibrationResult, Calibrator, GridScore};
pub use metrics::{accuracy, brier_score, log_loss, EvaluationReport};
