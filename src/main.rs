use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use atp_terminal::enrich::{self, DatasetSnapshot, PriceBand};
use atp_terminal::odds_profile::{self, CategoryDimension};
use atp_terminal::raw_csv;
use atp_terminal::win_tally::{filtered_win_tally, CategoryFilter};

const DEFAULT_CSV_PATH: &str = "data/cleaned_atp.csv";

fn main() -> Result<()> {
    let path = csv_path();
    println!("Loading match data from {}", path.display());

    let (rows, load) = raw_csv::load_matches(&path);
    if let Some(err) = &load.source_error {
        eprintln!("[WARN] {err}; continuing with an empty dataset");
    }

    let mut rng = rand::thread_rng();
    let (snapshot, repair) = enrich::build_snapshot(&rows, &mut rng);
    let snapshot = enrich::publish(snapshot);

    println!(
        "Rows: {} read, {} skipped, {} enriched ({} with winner odds)",
        load.rows_read,
        load.rows_skipped,
        snapshot.matches.len(),
        snapshot.decided.len()
    );
    for (name, col) in [("Odd_1", repair.odd_1), ("Odd_2", repair.odd_2)] {
        let how = if col.used_fallback {
            "uniform fallback"
        } else {
            "fitted normal"
        };
        println!("{name}: {} valid, {} imputed ({how})", col.valid, col.imputed);
    }
    println!("Players indexed: {}", snapshot.players.len());

    if snapshot.is_empty() {
        println!("No data loaded; nothing to summarize.");
        return Ok(());
    }

    print_overall_tally(snapshot);
    print_band_digest(snapshot);
    print_odds_digest(snapshot);
    Ok(())
}

fn csv_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MATCHES_CSV").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH))
}

/// Top winners over the whole dataset: every observed category selected,
/// date range spanning the data.
fn print_overall_tally(snapshot: &DatasetSnapshot) {
    let filter = full_range_filter(snapshot);
    let tally = filtered_win_tally(snapshot, &filter);
    println!("\nTop winners:");
    for (pos, row) in tally.iter().enumerate() {
        println!("{:>3}. {:<24} {:>5}", pos + 1, row.player, row.wins);
    }
}

fn print_band_digest(snapshot: &DatasetSnapshot) {
    let favorites = snapshot
        .decided_rows()
        .filter(|row| row.winner_price == Some(PriceBand::Favorite))
        .count();
    let underdogs = snapshot.decided.len() - favorites;
    println!("\nDecided outcomes: {favorites} favorite wins, {underdogs} underdog wins");
}

fn print_odds_digest(snapshot: &DatasetSnapshot) {
    let Some(histograms) = odds_profile::odds_distribution(snapshot, CategoryDimension::Surface)
    else {
        println!("Winner-odds distribution unavailable (no decided odds)");
        return;
    };
    println!("\nWinner-odds distribution by surface:");
    for hist in &histograms {
        let total: u32 = hist.buckets.iter().map(|b| b.count).sum();
        let peak = hist
            .buckets
            .iter()
            .max_by_key(|b| b.count)
            .map(|b| b.lower)
            .unwrap_or(1.0);
        println!(
            "{:<10} {:>6} decided, modal bucket {:.1}-{:.1}",
            hist.category,
            total,
            peak,
            peak + odds_profile::BUCKET_WIDTH
        );
    }
}

fn full_range_filter(snapshot: &DatasetSnapshot) -> CategoryFilter {
    let mut filter = CategoryFilter::default();
    let mut min: Option<NaiveDate> = None;
    let mut max: Option<NaiveDate> = None;
    for row in &snapshot.matches {
        if !filter.surfaces.contains(&row.surface) {
            filter.surfaces.push(row.surface.clone());
        }
        if !filter.series.contains(&row.series) {
            filter.series.push(row.series.clone());
        }
        if !filter.courts.contains(&row.court) {
            filter.courts.push(row.court.clone());
        }
        min = Some(min.map_or(row.date, |d| d.min(row.date)));
        max = Some(max.map_or(row.date, |d| d.max(row.date)));
    }
    filter.date_from = min;
    filter.date_to = max;
    filter
}
