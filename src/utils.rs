//! Utility functions for the forecasting pipeline

use crate::types::MatchRecord;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique model ID
pub fn generate_model_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Check that match dates never go backwards
pub fn is_chronological(records: &[MatchRecord]) -> bool {
    records.windows(2).all(|pair| pair[0].date <= pair[1].date)
}
