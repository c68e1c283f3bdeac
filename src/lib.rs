//! WSL Forecast - Elo ratings and outcome probabilities for league football
//!
//! This crate fits Elo ratings to a chronological match history, turns rating
//! gaps into home-win/draw/away-win probabilities with the Davidson tie model,
//! calibrates the model over a parameter grid and serves predictions over HTTP.

pub mod artifact;
pub mod calibration;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ForecastError, Result};
pub use types::*;

// Re-export key components
pub use artifact::{ModelArtifact, TrainingSummary};
pub use calibration::{evaluate_walk_forward, Calibrator, EvaluationReport};
pub use rating::{EloModel, InMemoryRatingStore, RatingStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
