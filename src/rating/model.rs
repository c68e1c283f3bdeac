//! Rating model: one configuration bound to one rating store

use crate::config::ModelConfig;
use crate::error::Result;
use crate::rating::calculator::{replay, RatingUpdateRule};
use crate::rating::davidson::davidson_probabilities;
use crate::rating::elo::EloUpdateRule;
use crate::rating::storage::{InMemoryRatingStore, RatingStorage};
use crate::types::{MatchRecord, Prediction, RatingChange};

/// Elo ratings plus the Davidson outcome model
///
/// The configuration is fixed for the lifetime of the store; a different
/// configuration needs a fresh model and a replay of the match history.
#[derive(Debug, Clone, PartialEq)]
pub struct EloModel {
    config: ModelConfig,
    rule: EloUpdateRule,
    store: InMemoryRatingStore,
}

impl EloModel {
    /// Create an untrained model after validating the configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(
            config,
            InMemoryRatingStore::new(config.initial_rating),
        ))
    }

    /// Pair a configuration with an existing store
    pub fn from_parts(config: ModelConfig, store: InMemoryRatingStore) -> Self {
        Self {
            config,
            rule: EloUpdateRule::from_config(&config),
            store,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn store(&self) -> &InMemoryRatingStore {
        &self.store
    }

    pub fn get_rating(&self, team: &str) -> f64 {
        self.store.get_rating(team)
    }

    /// Apply one completed match
    pub fn update(
        &mut self,
        home: &str,
        away: &str,
        home_goals: u32,
        away_goals: u32,
    ) -> RatingChange {
        self.rule
            .update(&mut self.store, home, away, home_goals, away_goals)
    }

    /// Apply matches in order, returning how many were processed
    pub fn replay(&mut self, records: &[MatchRecord]) -> usize {
        replay(&self.rule, &mut self.store, records)
    }

    /// Outcome probabilities from the current ratings
    pub fn predict(&self, home: &str, away: &str) -> Prediction {
        let r_home = self.store.get_rating(home);
        let r_away = self.store.get_rating(away);
        let probs = davidson_probabilities(r_home, r_away, self.config.home_adv, self.config.nu);
        Prediction::new(probs, r_home, r_away)
    }
}
