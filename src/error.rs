//! Error types for the forecasting pipeline
//!
//! Domain errors are defined with thiserror and surfaced through the anyhow
//! based `Result` alias, so callers can `downcast_ref::<ForecastError>()` when
//! they need to branch on the kind.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific forecasting scenarios
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Malformed match record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Invalid split: {reason}")]
    InvalidSplit { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("Unsupported accept: {accept}")]
    UnsupportedAccept { accept: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Artifact error: {message}")]
    ArtifactError { message: String },
}

impl ForecastError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
