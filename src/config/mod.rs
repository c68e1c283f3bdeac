//! Configuration management for the forecaster
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values for model training and serving.

pub mod app;
pub mod calibration;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, DataSettings, ServiceSettings};
pub use calibration::CalibrationConfig;
pub use rating::{ModelConfig, DEFAULT_INITIAL_RATING};
