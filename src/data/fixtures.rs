//! Upcoming fixtures in, per-fixture predictions out

use crate::error::Result;
use crate::rating::model::EloModel;
use crate::types::Fixture;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One output row of a batch prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixturePrediction {
    pub gameweek: String,
    pub date: String,
    pub home: String,
    pub away: String,
    pub p_home_win: f64,
    pub p_draw: f64,
    pub p_away_win: f64,
    pub r_home: f64,
    pub r_away: f64,
}

/// Read fixtures with `date,home,away` and an optional `gameweek` column
pub fn read_fixtures<R: Read>(reader: R) -> Result<Vec<Fixture>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut fixtures = Vec::new();
    for (i, row) in csv_reader.deserialize::<Fixture>().enumerate() {
        fixtures.push(row.with_context(|| format!("Invalid fixture at row {}", i + 1))?);
    }
    Ok(fixtures)
}

/// Predict every fixture from the model's current ratings
///
/// Fixtures without their own gameweek take `default_gameweek`.
pub fn predict_fixtures(
    model: &EloModel,
    fixtures: &[Fixture],
    default_gameweek: &str,
) -> Vec<FixturePrediction> {
    fixtures
        .iter()
        .map(|fixture| {
            let prediction = model.predict(&fixture.home, &fixture.away);
            FixturePrediction {
                gameweek: fixture
                    .gameweek
                    .clone()
                    .unwrap_or_else(|| default_gameweek.to_string()),
                date: fixture.date.clone(),
                home: fixture.home.clone(),
                away: fixture.away.clone(),
                p_home_win: prediction.p_home_win,
                p_draw: prediction.p_draw,
                p_away_win: prediction.p_away_win,
                r_home: prediction.r_home,
                r_away: prediction.r_away,
            }
        })
        .collect()
}

/// Write prediction rows as CSV, header included even when empty
pub fn write_predictions<W: Write>(writer: W, rows: &[FixturePrediction]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record([
        "gameweek",
        "date",
        "home",
        "away",
        "p_home_win",
        "p_draw",
        "p_away_win",
        "r_home",
        "r_away",
    ])?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Mean home-win probability across rows, 0 when there are none
pub fn average_home_win_probability(rows: &[FixturePrediction]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.p_home_win).sum::<f64>() / rows.len() as f64
}
