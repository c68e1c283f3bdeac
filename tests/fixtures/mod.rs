//! Shared sample data for integration testing

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use wsl_forecast::types::MatchRecord;
use wsl_forecast::utils::generate_model_id;

const HOME_GOALS: [u32; 10] = [2, 1, 3, 0, 1, 2, 2, 1, 0, 1];
const AWAY_GOALS: [u32; 10] = [1, 2, 0, 3, 1, 1, 0, 2, 2, 1];

/// Twenty weekly Arsenal/Chelsea fixtures alternating home side
pub fn sample_matches() -> Vec<MatchRecord> {
    let first = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
    (0..20)
        .map(|i| {
            let (home, away) = if i % 2 == 0 {
                ("Arsenal", "Chelsea")
            } else {
                ("Chelsea", "Arsenal")
            };
            MatchRecord::new(
                first + Duration::weeks(i as i64),
                home,
                away,
                HOME_GOALS[i % 10],
                AWAY_GOALS[i % 10],
            )
        })
        .collect()
}

/// The same sample as raw CSV, extra columns included
pub fn sample_csv() -> String {
    let mut csv = String::from(
        "Date,Time,Home,Away,Home_Team_Score,Away_Team_Score,Home_Team_xG,Home_Team_xG.1\n",
    );
    for record in sample_matches() {
        csv.push_str(&format!(
            "{},19:45,{},{},{},{},1.0,1.0\n",
            record.date.format("%Y-%m-%d"),
            record.home,
            record.away,
            record.home_goals,
            record.away_goals
        ));
    }
    csv
}

/// A round-robin season over a handful of clubs with deterministic scores
pub fn league_season(teams: &[&str], rounds: usize) -> Vec<MatchRecord> {
    let mut date = NaiveDate::from_ymd_opt(2023, 9, 3).unwrap();
    let mut records = Vec::new();
    let mut seed: u64 = 7;
    for _ in 0..rounds {
        for (h, home) in teams.iter().enumerate() {
            for (a, away) in teams.iter().enumerate() {
                if h == a {
                    continue;
                }
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let home_goals = ((seed >> 33) % 4) as u32 + u32::from(h < a);
                let away_goals = ((seed >> 45) % 3) as u32;
                records.push(MatchRecord::new(date, *home, *away, home_goals, away_goals));
                date += Duration::days(1);
            }
        }
    }
    records
}

/// Fresh scratch directory under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wsl-forecast-{}-{}", label, generate_model_id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
