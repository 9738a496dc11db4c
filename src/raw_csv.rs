use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

/// One row of the raw results CSV, exactly as exported. Every field is
/// optional here; validation happens in [`parse_raw_row`] so that a single
/// bad cell never aborts the whole load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Player_1", default)]
    pub player_1: Option<String>,
    #[serde(rename = "Player_2", default)]
    pub player_2: Option<String>,
    #[serde(rename = "Winner", default)]
    pub winner: Option<String>,
    #[serde(rename = "Odd_1", default)]
    pub odd_1: Option<String>,
    #[serde(rename = "Odd_2", default)]
    pub odd_2: Option<String>,
    #[serde(rename = "Surface", default)]
    pub surface: Option<String>,
    #[serde(rename = "Series", default)]
    pub series: Option<String>,
    #[serde(rename = "Court", default)]
    pub court: Option<String>,
    #[serde(rename = "Round", default)]
    pub round: Option<String>,
    #[serde(rename = "Total_sets_needed", default)]
    pub sets_needed: Option<String>,
    #[serde(rename = "Score", default)]
    pub score: Option<String>,
    #[serde(rename = "Break_pts_1", default)]
    pub break_pts_1: Option<String>,
    #[serde(rename = "Break_pts_2", default)]
    pub break_pts_2: Option<String>,
    #[serde(rename = "Tournament", default)]
    pub tournament: Option<String>,
}

/// A raw row after type normalization. Odds stay `Option<f64>`: invalid
/// quotes are repaired later by the enrichment pass, not here.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub date: NaiveDate,
    pub player_1: String,
    pub player_2: String,
    pub winner: String,
    pub odd_1: Option<f64>,
    pub odd_2: Option<f64>,
    pub surface: String,
    pub series: String,
    pub court: String,
    pub round: String,
    pub sets_needed: u8,
    pub score: String,
    pub break_pts_1: Option<u32>,
    pub break_pts_2: Option<u32>,
    pub tournament: String,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Set when the file itself could not be opened or decoded; the caller
    /// got an empty row set and should render "no data" states.
    pub source_error: Option<String>,
}

/// Load the raw match table. A missing or unreadable file is not fatal:
/// the result is an empty row set plus a report explaining why.
pub fn load_matches(path: &Path) -> (Vec<RawMatch>, LoadReport) {
    let mut report = LoadReport {
        path: path.to_path_buf(),
        rows_read: 0,
        rows_skipped: 0,
        source_error: None,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            report.source_error = Some(format!("open {}: {err}", path.display()));
            return (Vec::new(), report);
        }
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let mut out = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        report.rows_read += 1;
        let parsed = match record {
            Ok(row) => parse_raw_row(&row),
            Err(_) => None,
        };
        match parsed {
            Some(row) => out.push(row),
            None => report.rows_skipped += 1,
        }
    }
    (out, report)
}

/// Turn a CSV row into a typed row. Returns `None` when the row is missing
/// its date, either participant, or the declared winner.
pub fn parse_raw_row(row: &CsvRow) -> Option<RawMatch> {
    let date = parse_date(row.date.as_deref()?)?;
    let player_1 = nonempty(row.player_1.as_deref())?;
    let player_2 = nonempty(row.player_2.as_deref())?;
    let winner = nonempty(row.winner.as_deref())?;

    Some(RawMatch {
        date,
        player_1,
        player_2,
        winner,
        odd_1: parse_odd(row.odd_1.as_deref()),
        odd_2: parse_odd(row.odd_2.as_deref()),
        surface: text_or_empty(row.surface.as_deref()),
        series: text_or_empty(row.series.as_deref()),
        court: text_or_empty(row.court.as_deref()),
        round: text_or_empty(row.round.as_deref()),
        sets_needed: parse_sets(row.sets_needed.as_deref()),
        score: text_or_empty(row.score.as_deref()),
        break_pts_1: parse_count(row.break_pts_1.as_deref()),
        break_pts_2: parse_count(row.break_pts_2.as_deref()),
        tournament: text_or_empty(row.tournament.as_deref()),
    })
}

fn nonempty(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn text_or_empty(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Dataset exports carry ISO dates; older cuts use day-first.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// Lenient numeric parse for a quoted odd. Non-numeric and non-finite cells
/// become `None`; sign and range checks are the enrichment pass's job.
pub fn parse_odd(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let value = s.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn parse_sets(raw: Option<&str>) -> u8 {
    raw.and_then(|s| s.trim().parse::<u8>().ok()).unwrap_or(3)
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok()
}
