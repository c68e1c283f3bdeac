//! Team rating system: Elo updates and Davidson outcome probabilities
//!
//! This module provides the rating store, the update rule that moves ratings
//! after each match, and the model that turns two ratings into home/draw/away
//! probabilities.

pub mod calculator;
pub mod davidson;
pub mod elo;
pub mod model;
pub mod storage;

// Re-export commonly used types
pub use calculator::{replay, RatingUpdateRule};
pub use davidson::davidson_probabilities;
pub use elo::{expected_score, EloUpdateRule};
pub use model::EloModel;
pub use storage::{InMemoryRatingStore, RatingEntry, RatingStorage};
