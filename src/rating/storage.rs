//! Rating storage interface and implementations
//!
//! This module defines the interface for reading and writing team ratings,
//! with an owned in-memory implementation used by training and serving.

use crate::config::DEFAULT_INITIAL_RATING;
use crate::types::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage entry for a team's rating with bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub rating: f64,
    pub matches_played: u64,
}

impl RatingEntry {
    /// Create a new rating entry for a team that has not played yet
    pub fn new(initial_rating: f64) -> Self {
        Self {
            rating: initial_rating,
            matches_played: 0,
        }
    }

    /// Update the rating and increment matches played
    pub fn update_rating(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.matches_played += 1;
    }
}

/// Trait for rating storage operations
///
/// Unseen teams are a normal case (newly promoted clubs): reads fall back to
/// the store's initial rating instead of failing.
pub trait RatingStorage {
    /// Rating handed out to teams never seen before
    fn initial_rating(&self) -> f64;

    /// Current rating, or the initial rating for an unseen team
    fn get_rating(&self, team: &str) -> f64;

    /// Overwrite a team's rating unconditionally
    fn set_rating(&mut self, team: &str, rating: f64);

    /// Write the rating produced by a processed match
    fn record_match_rating(&mut self, team: &str, rating: f64);

    /// Number of matches that updated this team
    fn matches_played(&self, team: &str) -> u64;

    /// All stored (team, rating) pairs in team order
    fn ratings(&self) -> Vec<(TeamId, f64)>;

    /// Get total number of rated teams
    fn team_count(&self) -> usize;
}

/// In-memory rating storage implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryRatingStore {
    initial_rating: f64,
    entries: BTreeMap<TeamId, RatingEntry>,
}

impl InMemoryRatingStore {
    /// Create an empty store
    pub fn new(initial_rating: f64) -> Self {
        Self {
            initial_rating,
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a store from previously exported entries
    pub fn from_entries(initial_rating: f64, entries: BTreeMap<TeamId, RatingEntry>) -> Self {
        Self {
            initial_rating,
            entries,
        }
    }

    pub fn entries(&self) -> &BTreeMap<TeamId, RatingEntry> {
        &self.entries
    }

    pub fn contains(&self, team: &str) -> bool {
        self.entries.contains_key(team)
    }

    fn entry_mut(&mut self, team: &str) -> &mut RatingEntry {
        let initial_rating = self.initial_rating;
        self.entries
            .entry(team.to_string())
            .or_insert_with(|| RatingEntry::new(initial_rating))
    }
}

impl Default for InMemoryRatingStore {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_RATING)
    }
}

impl RatingStorage for InMemoryRatingStore {
    fn initial_rating(&self) -> f64 {
        self.initial_rating
    }

    fn get_rating(&self, team: &str) -> f64 {
        self.entries
            .get(team)
            .map(|entry| entry.rating)
            .unwrap_or(self.initial_rating)
    }

    fn set_rating(&mut self, team: &str, rating: f64) {
        self.entry_mut(team).rating = rating;
    }

    fn record_match_rating(&mut self, team: &str, rating: f64) {
        self.entry_mut(team).update_rating(rating);
    }

    fn matches_played(&self, team: &str) -> u64 {
        self.entries
            .get(team)
            .map(|entry| entry.matches_played)
            .unwrap_or(0)
    }

    fn ratings(&self) -> Vec<(TeamId, f64)> {
        self.entries
            .iter()
            .map(|(team, entry)| (team.clone(), entry.rating))
            .collect()
    }

    fn team_count(&self) -> usize {
        self.entries.len()
    }
}
