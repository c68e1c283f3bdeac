//! Elo expected score and update rule
//!
//! Ratings live on the usual base-10 / 400-point logistic scale. The home side
//! is credited with `home_adv` extra points when computing its expectation.

use crate::config::ModelConfig;
use crate::rating::calculator::RatingUpdateRule;
use crate::rating::storage::RatingStorage;
use crate::types::{Outcome, RatingChange};
use serde::{Deserialize, Serialize};

/// Points on the rating scale per factor of ten in strength
pub const RATING_SCALE: f64 = 400.0;

/// Expected score of the home side, in [0, 1]
pub fn expected_score(r_home: f64, r_away: f64, home_adv: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((r_away - (r_home + home_adv)) / RATING_SCALE))
}

/// Standard two-team Elo update with home advantage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloUpdateRule {
    pub k: f64,
    pub home_adv: f64,
}

impl EloUpdateRule {
    pub fn new(k: f64, home_adv: f64) -> Self {
        Self { k, home_adv }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.k, config.home_adv)
    }
}

impl RatingUpdateRule for EloUpdateRule {
    fn update(
        &self,
        store: &mut dyn RatingStorage,
        home: &str,
        away: &str,
        home_goals: u32,
        away_goals: u32,
    ) -> RatingChange {
        let old_home = store.get_rating(home);
        let old_away = store.get_rating(away);

        let expected_home = expected_score(old_home, old_away, self.home_adv);
        let expected_away = 1.0 - expected_home;

        let (actual_home, actual_away) = Outcome::from_goals(home_goals, away_goals).actual_scores();

        let new_home = old_home + self.k * (actual_home - expected_home);
        let new_away = old_away + self.k * (actual_away - expected_away);

        store.record_match_rating(home, new_home);
        store.record_match_rating(away, new_away);

        RatingChange {
            home: home.to_string(),
            away: away.to_string(),
            old_home,
            new_home,
            old_away,
            new_away,
            expected_home,
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "K": self.k,
            "home_adv": self.home_adv
        })
    }
}
