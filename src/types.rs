//! Common types used throughout the forecasting pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Team identifier as it appears in the source data
pub type TeamId = String;

/// A completed match, the only input the rating model learns from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub home: TeamId,
    pub away: TeamId,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl MatchRecord {
    pub fn new(
        date: NaiveDate,
        home: impl Into<TeamId>,
        away: impl Into<TeamId>,
        home_goals: u32,
        away_goals: u32,
    ) -> Self {
        Self {
            date,
            home: home.into(),
            away: away.into(),
            home_goals,
            away_goals,
        }
    }

    /// Realized outcome from the home side's point of view
    pub fn outcome(&self) -> Outcome {
        Outcome::from_goals(self.home_goals, self.away_goals)
    }
}

/// Three-way match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Fixed index order used by accuracy and one-hot encodings
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    pub fn from_goals(home_goals: u32, away_goals: u32) -> Self {
        if home_goals > away_goals {
            Outcome::HomeWin
        } else if home_goals < away_goals {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        }
    }

    pub fn index(self) -> usize {
        match self {
            Outcome::HomeWin => 0,
            Outcome::Draw => 1,
            Outcome::AwayWin => 2,
        }
    }

    /// Actual scores for (home, away) as used by the Elo update
    pub fn actual_scores(self) -> (f64, f64) {
        match self {
            Outcome::HomeWin => (1.0, 0.0),
            Outcome::Draw => (0.5, 0.5),
            Outcome::AwayWin => (0.0, 1.0),
        }
    }

    pub fn one_hot(self) -> [f64; 3] {
        let mut y = [0.0; 3];
        y[self.index()] = 1.0;
        y
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::HomeWin => write!(f, "home_win"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::AwayWin => write!(f, "away_win"),
        }
    }
}

/// Home/draw/away probability triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub p_home_win: f64,
    pub p_draw: f64,
    pub p_away_win: f64,
}

impl OutcomeProbabilities {
    pub fn as_array(&self) -> [f64; 3] {
        [self.p_home_win, self.p_draw, self.p_away_win]
    }

    pub fn probability_of(&self, outcome: Outcome) -> f64 {
        self.as_array()[outcome.index()]
    }

    /// Most likely outcome; exact ties go to the earlier of home, draw, away
    pub fn most_likely(&self) -> Outcome {
        let probs = self.as_array();
        let mut best = 0;
        for (i, p) in probs.iter().enumerate().skip(1) {
            if *p > probs[best] {
                best = i;
            }
        }
        Outcome::ALL[best]
    }

    pub fn total(&self) -> f64 {
        self.p_home_win + self.p_draw + self.p_away_win
    }
}

/// Model output for a single fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub p_home_win: f64,
    pub p_draw: f64,
    pub p_away_win: f64,
    pub r_home: f64,
    pub r_away: f64,
}

impl Prediction {
    pub fn new(probs: OutcomeProbabilities, r_home: f64, r_away: f64) -> Self {
        Self {
            p_home_win: probs.p_home_win,
            p_draw: probs.p_draw,
            p_away_win: probs.p_away_win,
            r_home,
            r_away,
        }
    }

    pub fn probabilities(&self) -> OutcomeProbabilities {
        OutcomeProbabilities {
            p_home_win: self.p_home_win,
            p_draw: self.p_draw,
            p_away_win: self.p_away_win,
        }
    }
}

/// Rating movement for both sides of one processed match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub home: TeamId,
    pub away: TeamId,
    pub old_home: f64,
    pub new_home: f64,
    pub old_away: f64,
    pub new_away: f64,
    pub expected_home: f64,
}

impl RatingChange {
    pub fn home_delta(&self) -> f64 {
        self.new_home - self.old_home
    }

    pub fn away_delta(&self) -> f64 {
        self.new_away - self.old_away
    }
}

/// Inference request for one fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub home_team: TeamId,
    pub away_team: TeamId,
}

/// Upcoming fixture for batch prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub gameweek: Option<String>,
    pub date: String,
    pub home: TeamId,
    pub away: TeamId,
}
