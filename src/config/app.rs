//! Main application configuration
//!
//! This module defines the primary configuration structures for the forecaster,
//! including TOML file loading, environment variable overrides and validation.

use crate::config::calibration::CalibrationConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub data: DataSettings,
    pub calibration: CalibrationConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Address the inference server binds to
    pub host: String,
    /// Port for the inference server
    pub port: u16,
}

/// Dataset split settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Leading share of matches used for rating replay
    pub train_pct: f64,
    /// Share of matches used to score grid points
    pub val_pct: f64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "wsl-forecast".to_string(),
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            train_pct: 0.70,
            val_pct: 0.15,
        }
    }
}

fn parse_list(name: &str, raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| anyhow!("Invalid {} value: {}", name, raw))
        })
        .collect()
}

impl AppConfig {
    /// Load configuration from a TOML file, then validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.service.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            config.service.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid SERVER_PORT value: {}", port))?;
        }

        // Data settings
        if let Ok(train_pct) = env::var("TRAIN_PCT") {
            config.data.train_pct = train_pct
                .parse()
                .map_err(|_| anyhow!("Invalid TRAIN_PCT value: {}", train_pct))?;
        }
        if let Ok(val_pct) = env::var("VAL_PCT") {
            config.data.val_pct = val_pct
                .parse()
                .map_err(|_| anyhow!("Invalid VAL_PCT value: {}", val_pct))?;
        }

        // Calibration grid
        if let Ok(values) = env::var("K_VALUES") {
            config.calibration.k_values = parse_list("K_VALUES", &values)?;
        }
        if let Ok(values) = env::var("HOME_ADV_VALUES") {
            config.calibration.home_adv_values = parse_list("HOME_ADV_VALUES", &values)?;
        }
        if let Ok(values) = env::var("NU_VALUES") {
            config.calibration.nu_values = parse_list("NU_VALUES", &values)?;
        }
        if let Ok(rating) = env::var("INITIAL_RATING") {
            config.calibration.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid INITIAL_RATING value: {}", rating))?;
        }
        if let Ok(parallel) = env::var("PARALLEL_SEARCH") {
            config.calibration.parallel = parallel
                .parse()
                .map_err(|_| anyhow!("Invalid PARALLEL_SEARCH value: {}", parallel))?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.port == 0 {
        return Err(anyhow!("Server port cannot be 0"));
    }

    // Validate split
    let data = &config.data;
    if data.train_pct <= 0.0 || data.val_pct <= 0.0 || data.train_pct + data.val_pct >= 1.0 {
        return Err(anyhow!(
            "Invalid split percentages: train_pct={}, val_pct={}",
            data.train_pct,
            data.val_pct
        ));
    }

    config.calibration.validate()?;

    Ok(())
}
