//! Trained model persistence
//!
//! A trained model is written as `model.json` (configuration plus every team's
//! rating entry) next to `metrics.json` with the calibration summary. Loading
//! the artifact rebuilds a model that predicts exactly what the saved one did.

use crate::calibration::grid::CalibrationResult;
use crate::calibration::metrics::EvaluationReport;
use crate::config::ModelConfig;
use crate::error::{ForecastError, Result};
use crate::rating::model::EloModel;
use crate::rating::storage::{InMemoryRatingStore, RatingEntry};
use crate::types::TeamId;
use crate::utils::{current_timestamp, generate_model_id};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const MODEL_FILE: &str = "model.json";
pub const METRICS_FILE: &str = "metrics.json";
pub const EVALUATION_FILE: &str = "evaluation.json";

/// Serialized rating model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub config: ModelConfig,
    pub ratings: BTreeMap<TeamId, RatingEntry>,
}

impl ModelArtifact {
    /// Snapshot a model under a fresh id
    pub fn from_model(model: &EloModel) -> Self {
        Self {
            model_id: generate_model_id(),
            trained_at: current_timestamp(),
            config: *model.config(),
            ratings: model.store().entries().clone(),
        }
    }

    /// Rebuild the model, validating the stored configuration
    pub fn into_model(self) -> Result<EloModel> {
        self.config.validate()?;
        let store = InMemoryRatingStore::from_entries(self.config.initial_rating, self.ratings);
        Ok(EloModel::from_parts(self.config, store))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(MODEL_FILE), self)?;
        info!(
            "Saved model {} with {} teams to {}",
            self.model_id,
            self.ratings.len(),
            dir.display()
        );
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        read_json(&dir.join(MODEL_FILE))
    }
}

/// Calibration summary handed to the model registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    #[serde(rename = "best_K")]
    pub best_k: f64,
    pub best_home_adv: f64,
    pub best_nu: f64,
    pub val_score: f64,
}

impl From<&CalibrationResult> for TrainingSummary {
    fn from(result: &CalibrationResult) -> Self {
        Self {
            best_k: result.best_config.k,
            best_home_adv: result.best_config.home_adv,
            best_nu: result.best_config.nu,
            val_score: result.best_score,
        }
    }
}

impl TrainingSummary {
    pub fn save(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(METRICS_FILE), self)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        read_json(&dir.join(METRICS_FILE))
    }
}

pub fn save_evaluation(dir: &Path, report: &EvaluationReport) -> Result<()> {
    write_json(&dir.join(EVALUATION_FILE), report)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ForecastError::ArtifactError {
            message: format!("{} not found", path.display()),
        }
        .into());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| {
        ForecastError::ArtifactError {
            message: format!("{} is not a valid artifact: {}", path.display(), e),
        }
        .into()
    })
}
