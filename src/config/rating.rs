//! Rating model configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Default rating assigned to teams seen for the first time
pub const DEFAULT_INITIAL_RATING: f64 = 1500.0;

/// Hyperparameters governing one rating store's whole update history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Learning rate of the Elo update
    #[serde(rename = "K")]
    pub k: f64,
    /// Rating points added to the home side
    pub home_adv: f64,
    /// Davidson tie propensity
    pub nu: f64,
    pub initial_rating: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            k: 20.0,
            home_adv: 100.0,
            nu: 0.15,
            initial_rating: DEFAULT_INITIAL_RATING,
        }
    }
}

impl ModelConfig {
    pub fn new(k: f64, home_adv: f64, nu: f64) -> Self {
        Self {
            k,
            home_adv,
            nu,
            ..Self::default()
        }
    }

    pub fn with_initial_rating(mut self, initial_rating: f64) -> Self {
        self.initial_rating = initial_rating;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ForecastError::configuration(format!(
                "K must be positive and finite, got {}",
                self.k
            ))
            .into());
        }

        if !self.home_adv.is_finite() {
            return Err(ForecastError::configuration("home_adv must be finite").into());
        }

        if !self.nu.is_finite() || self.nu < 0.0 {
            return Err(ForecastError::configuration(format!(
                "nu must be non-negative and finite, got {}",
                self.nu
            ))
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(ForecastError::configuration("initial_rating must be finite").into());
        }

        Ok(())
    }
}
