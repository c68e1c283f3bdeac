//! Rating update trait and replay helpers
//!
//! This module defines the interface for turning a completed match into
//! rating changes, and the sequential replay used by training.

use crate::rating::storage::RatingStorage;
use crate::types::{MatchRecord, RatingChange};
use tracing::debug;

/// Trait for applying a completed match to a rating store
pub trait RatingUpdateRule: Send + Sync {
    /// Update both teams' ratings from a final score
    ///
    /// # Arguments
    /// * `store` - Ratings to read from and write to
    /// * `home` / `away` - Team identifiers
    /// * `home_goals` / `away_goals` - Final score
    ///
    /// # Returns
    /// The rating movement applied to the store. Exactly two entries of the
    /// store are written.
    fn update(
        &self,
        store: &mut dyn RatingStorage,
        home: &str,
        away: &str,
        home_goals: u32,
        away_goals: u32,
    ) -> RatingChange;

    /// Apply a match record
    fn apply(&self, store: &mut dyn RatingStorage, record: &MatchRecord) -> RatingChange {
        self.update(
            store,
            &record.home,
            &record.away,
            record.home_goals,
            record.away_goals,
        )
    }

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Replay matches in the given order through an update rule
///
/// Order matters: Elo updates do not commute, so callers must pass records
/// sorted by date.
pub fn replay(
    rule: &dyn RatingUpdateRule,
    store: &mut dyn RatingStorage,
    records: &[MatchRecord],
) -> usize {
    for record in records {
        let change = rule.apply(store, record);
        debug!(
            "{} {}-{} {}: {:.1} -> {:.1}, {:.1} -> {:.1}",
            record.home,
            record.home_goals,
            record.away_goals,
            record.away,
            change.old_home,
            change.new_home,
            change.old_away,
            change.new_away
        );
    }
    records.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::storage::InMemoryRatingStore;
    use chrono::NaiveDate;

    /// Rule that moves the winner up by one point, for observing replay order
    struct StepRule;

    impl RatingUpdateRule for StepRule {
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
            let (new_home, new_away) = if home_goals > away_goals {
                (old_home + 1.0, old_away)
            } else if away_goals > home_goals {
                (old_home, old_away + 1.0)
            } else {
                (old_home, old_away)
            };
            store.record_match_rating(home, new_home);
            store.record_match_rating(away, new_away);
            RatingChange {
                home: home.to_string(),
                away: away.to_string(),
                old_home,
                new_home,
                old_away,
                new_away,
                expected_home: 0.5,
            }
        }

        fn config(&self) -> serde_json::Value {
            serde_json::json!({ "type": "step" })
        }
    }

    #[test]
    fn test_replay_applies_every_record() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let records = vec![
            MatchRecord::new(date, "A", "B", 1, 0),
            MatchRecord::new(date, "B", "C", 2, 2),
            MatchRecord::new(date, "C", "A", 0, 3),
        ];
        let mut store = InMemoryRatingStore::new(0.0);

        let processed = replay(&StepRule, &mut store, &records);

        assert_eq!(processed, 3);
        assert_eq!(store.get_rating("A"), 2.0);
        assert_eq!(store.get_rating("B"), 0.0);
        assert_eq!(store.matches_played("A"), 2);
        assert_eq!(store.matches_played("B"), 2);
        assert_eq!(store.matches_played("C"), 2);
    }

    #[test]
    fn test_replay_empty_is_noop() {
        let mut store = InMemoryRatingStore::default();
        assert_eq!(replay(&StepRule, &mut store, &[]), 0);
        assert_eq!(store.team_count(), 0);
    }
}
