//! Hyperparameter grid configuration

use crate::config::rating::{ModelConfig, DEFAULT_INITIAL_RATING};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Candidate values scanned by the calibrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub k_values: Vec<f64>,
    pub home_adv_values: Vec<f64>,
    pub nu_values: Vec<f64>,
    pub initial_rating: f64,
    /// Evaluate grid points on the rayon pool
    pub parallel: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            k_values: vec![10.0, 20.0, 30.0, 40.0],
            home_adv_values: vec![50.0, 100.0, 150.0],
            nu_values: vec![0.10, 0.15, 0.20, 0.25],
            initial_rating: DEFAULT_INITIAL_RATING,
            parallel: true,
        }
    }
}

impl CalibrationConfig {
    /// Number of grid points in the Cartesian product
    pub fn grid_size(&self) -> usize {
        self.k_values.len() * self.home_adv_values.len() * self.nu_values.len()
    }

    /// Enumerate grid points, K outermost and nu innermost
    pub fn candidates(&self) -> Vec<ModelConfig> {
        let mut out = Vec::with_capacity(self.grid_size());
        for &k in &self.k_values {
            for &home_adv in &self.home_adv_values {
                for &nu in &self.nu_values {
                    out.push(
                        ModelConfig::new(k, home_adv, nu).with_initial_rating(self.initial_rating),
                    );
                }
            }
        }
        out
    }

    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("K", &self.k_values),
            ("home_adv", &self.home_adv_values),
            ("nu", &self.nu_values),
        ];
        for (name, values) in lists {
            if values.is_empty() {
                return Err(ForecastError::configuration(format!(
                    "{} candidate grid is empty",
                    name
                ))
                .into());
            }
        }

        for candidate in self.candidates() {
            candidate.validate()?;
        }

        Ok(())
    }
}
