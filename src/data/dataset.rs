//! Match history ingest, validation and chronological splitting
//!
//! This is the boundary where records are checked. Everything downstream
//! assumes well-formed, date-ordered matches and does not re-validate.

use crate::error::{ForecastError, Result};
use crate::types::MatchRecord;
use crate::utils::is_chronological;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

pub const DATE_COLUMN: &str = "Date";
pub const HOME_COLUMN: &str = "Home";
pub const AWAY_COLUMN: &str = "Away";
pub const HOME_SCORE_COLUMN: &str = "Home_Team_Score";
pub const AWAY_SCORE_COLUMN: &str = "Away_Team_Score";

/// Columns every match history file must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    HOME_COLUMN,
    AWAY_COLUMN,
    HOME_SCORE_COLUMN,
    AWAY_SCORE_COLUMN,
];

/// Train / validation / test partitions, each in date order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSplit {
    pub train: Vec<MatchRecord>,
    pub val: Vec<MatchRecord>,
    pub test: Vec<MatchRecord>,
}

/// Row layout used when writing splits back to disk
#[derive(Serialize)]
struct MatchRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Home")]
    home: &'a str,
    #[serde(rename = "Away")]
    away: &'a str,
    #[serde(rename = "Home_Team_Score")]
    home_goals: u32,
    #[serde(rename = "Away_Team_Score")]
    away_goals: u32,
}

fn malformed(row: usize, reason: impl Into<String>) -> anyhow::Error {
    ForecastError::MalformedRecord {
        row,
        reason: reason.into(),
    }
    .into()
}

/// Parse a calendar date, ignoring any time-of-day suffix
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split(['T', ' ']).next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

fn parse_goals(raw: &str, column: &str, row: usize) -> Result<u32> {
    let raw = raw.trim();
    if let Ok(goals) = raw.parse::<u32>() {
        return Ok(goals);
    }
    // Exports sometimes carry integral floats such as "2.0"
    match raw.parse::<f64>() {
        Ok(value) if value < 0.0 => Err(malformed(
            row,
            format!("negative score in {}: {}", column, raw),
        )),
        Ok(value) if value.fract() == 0.0 && value <= u32::MAX as f64 => Ok(value as u32),
        _ => Err(malformed(row, format!("invalid score in {}: {:?}", column, raw))),
    }
}

fn required_field<'a>(
    raw: &'a csv::StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<&'a str> {
    match raw.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(malformed(row, format!("missing value in {}", column))),
    }
}

/// Read and validate match records from CSV, keeping file order
pub fn read_matches<R: Read>(reader: R) -> Result<Vec<MatchRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers().context("Failed to read CSV header")?.clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(malformed(0, format!("missing required columns: {:?}", missing)));
    }

    let index_of = |column: &str| headers.iter().position(|h| h == column).unwrap_or_default();
    let date_idx = index_of(DATE_COLUMN);
    let home_idx = index_of(HOME_COLUMN);
    let away_idx = index_of(AWAY_COLUMN);
    let home_score_idx = index_of(HOME_SCORE_COLUMN);
    let away_score_idx = index_of(AWAY_SCORE_COLUMN);

    let mut records = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let row = i + 1;
        let raw = result.with_context(|| format!("Failed to read CSV row {}", row))?;

        let date_raw = required_field(&raw, date_idx, DATE_COLUMN, row)?;
        let date = parse_match_date(date_raw)
            .ok_or_else(|| malformed(row, format!("invalid date: {:?}", date_raw)))?;
        let home = required_field(&raw, home_idx, HOME_COLUMN, row)?;
        let away = required_field(&raw, away_idx, AWAY_COLUMN, row)?;
        let home_goals = parse_goals(
            required_field(&raw, home_score_idx, HOME_SCORE_COLUMN, row)?,
            HOME_SCORE_COLUMN,
            row,
        )?;
        let away_goals = parse_goals(
            required_field(&raw, away_score_idx, AWAY_SCORE_COLUMN, row)?,
            AWAY_SCORE_COLUMN,
            row,
        )?;

        records.push(MatchRecord::new(date, home, away, home_goals, away_goals));
    }

    Ok(records)
}

/// Stable-sort records by date, warning when the input was out of order
pub fn sort_chronologically(records: &mut [MatchRecord]) {
    if !is_chronological(records) {
        warn!("Dates are not sorted, sorting {} matches chronologically", records.len());
        records.sort_by_key(|record| record.date);
    }
}

/// Load, validate and date-order a match history file
pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut records = read_matches(file)
        .with_context(|| format!("Failed to load matches from {}", path.display()))?;
    sort_chronologically(&mut records);

    info!("Loaded {} matches from {}", records.len(), path.display());
    Ok(records)
}

/// Split by date into leading train, middle validation and trailing test
///
/// Boundaries are `floor(n * train_pct)` and `floor(n * (train_pct + val_pct))`.
pub fn chronological_split(
    mut records: Vec<MatchRecord>,
    train_pct: f64,
    val_pct: f64,
) -> Result<DatasetSplit> {
    if records.is_empty() {
        return Err(ForecastError::InvalidSplit {
            reason: "cannot split an empty dataset".to_string(),
        }
        .into());
    }
    if !(train_pct > 0.0 && val_pct > 0.0 && train_pct + val_pct < 1.0) {
        return Err(ForecastError::InvalidSplit {
            reason: format!(
                "invalid split percentages train_pct={} val_pct={}",
                train_pct, val_pct
            ),
        }
        .into());
    }

    sort_chronologically(&mut records);

    let n = records.len();
    let train_end = (n as f64 * train_pct) as usize;
    let val_end = ((n as f64 * (train_pct + val_pct)) as usize).max(train_end);

    let test = records.split_off(val_end);
    let val = records.split_off(train_end);

    info!(
        "Split {} matches into {} train, {} validation, {} test",
        n,
        records.len(),
        val.len(),
        test.len()
    );

    Ok(DatasetSplit {
        train: records,
        val,
        test,
    })
}

/// Write records as CSV with the required columns
pub fn write_matches<W: Write>(writer: W, records: &[MatchRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(MatchRow {
            date: record.date,
            home: &record.home,
            away: &record.away,
            home_goals: record.home_goals,
            away_goals: record.away_goals,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_matches(path: &Path, records: &[MatchRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_matches(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Time,Home,Away,Home_Team_Score,Away_Team_Score,Home_Team_xG
2024-01-07,19:45,Arsenal,Chelsea,2,1,1.8
2024-01-14,19:45,Chelsea,Arsenal,1,2,1.2
2024-01-21,19:45,Arsenal,Chelsea,3,0,2.5
2024-01-28,19:45,Chelsea,Arsenal,0,3,0.8
";

    fn error_kind(err: &anyhow::Error) -> Option<&ForecastError> {
        err.chain().find_map(|e| e.downcast_ref::<ForecastError>())
    }

    #[test]
    fn test_read_matches_ignores_extra_columns() {
        let records = read_matches(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].home, "Arsenal");
        assert_eq!(records[0].home_goals, 2);
        assert_eq!(records[3].away_goals, 3);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    }

    #[test]
    fn test_missing_column() {
        let data = "Date,Away,Home_Team_Score,Away_Team_Score\n2024-01-07,Chelsea,2,1\n";
        let err = read_matches(data.as_bytes()).unwrap_err();
        assert!(matches!(
            error_kind(&err),
            Some(ForecastError::MalformedRecord { row: 0, .. })
        ));
        assert!(err.to_string().contains("Home"));
    }

    #[test]
    fn test_negative_score() {
        let data = "Date,Home,Away,Home_Team_Score,Away_Team_Score\n2024-01-07,A,B,-1,0\n";
        let err = read_matches(data.as_bytes()).unwrap_err();
        assert!(matches!(
            error_kind(&err),
            Some(ForecastError::MalformedRecord { row: 1, .. })
        ));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_empty_field_and_bad_date() {
        let empty = "Date,Home,Away,Home_Team_Score,Away_Team_Score\n2024-01-07,,B,1,0\n";
        assert!(read_matches(empty.as_bytes()).is_err());

        let bad_date = "Date,Home,Away,Home_Team_Score,Away_Team_Score\nyesterday,A,B,1,0\n";
        let err = read_matches(bad_date.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_integral_float_scores_accepted() {
        let data = "Date,Home,Away,Home_Team_Score,Away_Team_Score\n2024-01-07,A,B,2.0,1.0\n";
        let records = read_matches(data.as_bytes()).unwrap();
        assert_eq!((records[0].home_goals, records[0].away_goals), (2, 1));

        let fractional = "Date,Home,Away,Home_Team_Score,Away_Team_Score\n2024-01-07,A,B,2.5,1\n";
        assert!(read_matches(fractional.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_match_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 22);
        assert_eq!(parse_match_date("2024-09-22"), expected);
        assert_eq!(parse_match_date("2024-09-22T12:30:00Z"), expected);
        assert_eq!(parse_match_date("2024-09-22 12:30"), expected);
        assert_eq!(parse_match_date("22/09/2024"), expected);
        assert_eq!(parse_match_date("September"), None);
    }

    #[test]
    fn test_sort_chronologically_is_stable() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let mut records = vec![
            MatchRecord::new(d(10), "C", "D", 0, 0),
            MatchRecord::new(d(3), "A", "B", 1, 0),
            MatchRecord::new(d(10), "E", "F", 2, 2),
        ];
        sort_chronologically(&mut records);
        let homes: Vec<&str> = records.iter().map(|r| r.home.as_str()).collect();
        assert_eq!(homes, vec!["A", "C", "E"]);
    }

    #[test]
    fn test_chronological_split() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let records: Vec<MatchRecord> = (0..20)
            .map(|i| MatchRecord::new(start + chrono::Duration::weeks(i), "A", "B", 1, 0))
            .collect();

        let split = chronological_split(records, 0.7, 0.15).unwrap();

        assert_eq!(split.train.len(), 14);
        assert_eq!(split.val.len(), 3);
        assert_eq!(split.test.len(), 3);
        assert!(split.train.last().unwrap().date < split.val[0].date);
        assert!(split.val.last().unwrap().date < split.test[0].date);
    }

    #[test]
    fn test_invalid_split() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let records = vec![MatchRecord::new(date, "A", "B", 1, 0)];

        for (train, val) in [(0.0, 0.15), (0.7, 0.0), (0.8, 0.2), (0.9, 0.3)] {
            let err = chronological_split(records.clone(), train, val).unwrap_err();
            assert!(matches!(
                error_kind(&err),
                Some(ForecastError::InvalidSplit { .. })
            ));
        }

        assert!(chronological_split(Vec::new(), 0.7, 0.15).is_err());
    }

    #[test]
    fn test_write_then_read_preserves_records() {
        let records = read_matches(SAMPLE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_matches(&mut buffer, &records).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Date,Home,Away,Home_Team_Score,Away_Team_Score"));
        assert_eq!(read_matches(buffer.as_slice()).unwrap(), records);
    }
}
