//! Data ingest and export
//!
//! Match history CSV loading with boundary validation, chronological
//! train/validation/test splitting, and fixture files for batch prediction.

pub mod dataset;
pub mod fixtures;

pub use dataset::{
    chronological_split, load_matches, read_matches, save_matches, write_matches, DatasetSplit,
};
pub use fixtures::{predict_fixtures, read_fixtures, write_predictions, FixturePrediction};
