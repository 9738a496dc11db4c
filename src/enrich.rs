use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::OnceCell;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::raw_csv::RawMatch;

/// Floor applied to every repaired odd. Contract constant, kept as-is.
pub const MIN_REPAIRED_ODD: f64 = 1.01;
/// Winner odds at or below this are a favorite win; above, an underdog win.
pub const FAVORITE_MAX_ODD: f64 = 2.0;
/// Range for the uniform draw when a column has no valid odds at all.
const FALLBACK_LOW: f64 = 1.1;
const FALLBACK_HIGH: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    Favorite,
    Underdog,
}

/// One enriched contest. Odds are always `> 1.0` after repair; `winner_odd`
/// and `winner_price` stay `None` when the declared winner matches neither
/// listed participant.
#[derive(Debug, Clone)]
pub struct MatchRow {
    pub date: NaiveDate,
    pub year: i32,
    pub player_1: String,
    pub player_2: String,
    pub winner: String,
    pub odd_1: f64,
    pub odd_2: f64,
    pub surface: String,
    pub series: String,
    pub court: String,
    pub round: String,
    pub sets_needed: u8,
    pub score: String,
    pub break_pts_1: Option<u32>,
    pub break_pts_2: Option<u32>,
    pub tournament: String,
    pub winner_odd: Option<f64>,
    pub winner_price: Option<PriceBand>,
}

impl MatchRow {
    pub fn involves(&self, player: &str) -> bool {
        self.player_1 == player || self.player_2 == player
    }

    /// The quoted odd for `player` in this row, whichever side they are on.
    pub fn odd_for(&self, player: &str) -> Option<f64> {
        if self.player_1 == player {
            Some(self.odd_1)
        } else if self.player_2 == player {
            Some(self.odd_2)
        } else {
            None
        }
    }
}

/// How one odds column was repaired during a load.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnRepair {
    pub valid: usize,
    pub imputed: usize,
    /// True when the column had no valid values and the uniform fallback ran.
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichReport {
    pub odd_1: ColumnRepair,
    pub odd_2: ColumnRepair,
}

/// The immutable process-wide dataset. Built once per load; queries only
/// ever borrow it.
#[derive(Debug, Default)]
pub struct DatasetSnapshot {
    /// Enriched table, input order preserved.
    pub matches: Vec<MatchRow>,
    /// Indices into `matches` whose winner odd is defined.
    pub decided: Vec<usize>,
    /// Sorted, de-duplicated participant identifiers.
    pub players: Vec<String>,
}

impl DatasetSnapshot {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Rows of the decided-odds subset, in input order.
    pub fn decided_rows(&self) -> impl Iterator<Item = &MatchRow> {
        self.decided.iter().map(|&idx| &self.matches[idx])
    }
}

static SNAPSHOT: OnceCell<DatasetSnapshot> = OnceCell::new();

/// Publish the snapshot for the rest of the process. First caller wins;
/// later calls get the already-published snapshot back.
pub fn publish(snapshot: DatasetSnapshot) -> &'static DatasetSnapshot {
    SNAPSHOT.get_or_init(|| snapshot)
}

pub fn published() -> Option<&'static DatasetSnapshot> {
    SNAPSHOT.get()
}

/// Build the enriched table, decided-odds subset, and player index from raw
/// rows. All randomness for odds repair comes from `rng`, so a seeded rng
/// reproduces the snapshot exactly.
pub fn build_snapshot(rows: &[RawMatch], rng: &mut impl Rng) -> (DatasetSnapshot, EnrichReport) {
    let model_1 = ColumnModel::fit(rows.iter().map(|r| r.odd_1));
    let model_2 = ColumnModel::fit(rows.iter().map(|r| r.odd_2));

    let mut report = EnrichReport {
        odd_1: model_1.blank_repair(),
        odd_2: model_2.blank_repair(),
    };

    let mut matches = Vec::with_capacity(rows.len());
    let mut decided = Vec::new();
    let mut players = BTreeSet::new();

    for raw in rows {
        let odd_1 = model_1.repair(raw.odd_1, rng, &mut report.odd_1);
        let odd_2 = model_2.repair(raw.odd_2, rng, &mut report.odd_2);

        let winner_odd = if raw.winner == raw.player_1 {
            Some(odd_1)
        } else if raw.winner == raw.player_2 {
            Some(odd_2)
        } else {
            None
        };
        let winner_price = winner_odd.map(|odd| {
            if odd <= FAVORITE_MAX_ODD {
                PriceBand::Favorite
            } else {
                PriceBand::Underdog
            }
        });

        if winner_odd.is_some() {
            decided.push(matches.len());
        }
        players.insert(raw.player_1.clone());
        players.insert(raw.player_2.clone());

        matches.push(MatchRow {
            date: raw.date,
            year: raw.date.year(),
            player_1: raw.player_1.clone(),
            player_2: raw.player_2.clone(),
            winner: raw.winner.clone(),
            odd_1,
            odd_2,
            surface: raw.surface.clone(),
            series: raw.series.clone(),
            court: raw.court.clone(),
            round: raw.round.clone(),
            sets_needed: raw.sets_needed,
            score: raw.score.clone(),
            break_pts_1: raw.break_pts_1,
            break_pts_2: raw.break_pts_2,
            tournament: raw.tournament.clone(),
            winner_odd,
            winner_price,
        });
    }

    let snapshot = DatasetSnapshot {
        matches,
        decided,
        players: players.into_iter().collect(),
    };
    (snapshot, report)
}

/// Imputation model for one odds column: a normal fitted to the column's
/// valid values, or the uniform fallback when there are none.
enum ColumnModel {
    Fitted { dist: Normal<f64>, valid: usize },
    Fallback,
}

impl ColumnModel {
    fn fit(values: impl Iterator<Item = Option<f64>>) -> Self {
        let valid: Vec<f64> = values
            .flatten()
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if valid.is_empty() {
            return ColumnModel::Fallback;
        }
        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        // Sample std (n-1); a single-value column collapses to its mean.
        let std = if valid.len() >= 2 {
            let var = valid
                .iter()
                .map(|v| {
                    let d = v - mean;
                    d * d
                })
                .sum::<f64>()
                / (valid.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        match Normal::new(mean, std) {
            Ok(dist) => ColumnModel::Fitted {
                dist,
                valid: valid.len(),
            },
            Err(_) => ColumnModel::Fallback,
        }
    }

    fn blank_repair(&self) -> ColumnRepair {
        match self {
            ColumnModel::Fitted { valid, .. } => ColumnRepair {
                valid: *valid,
                ..ColumnRepair::default()
            },
            ColumnModel::Fallback => ColumnRepair {
                used_fallback: true,
                ..ColumnRepair::default()
            },
        }
    }

    /// Pass a usable quote through; replace anything else. Quotes at or
    /// below 1.0 count as unusable so the enriched table always satisfies
    /// `odd > 1.0`.
    fn repair(&self, value: Option<f64>, rng: &mut impl Rng, counters: &mut ColumnRepair) -> f64 {
        if let Some(v) = value
            && v > 1.0
        {
            return v;
        }
        counters.imputed += 1;
        match self {
            ColumnModel::Fitted { dist, .. } => {
                let drawn = dist.sample(rng);
                let rounded = (drawn * 100.0).round() / 100.0;
                rounded.max(MIN_REPAIRED_ODD)
            }
            ColumnModel::Fallback => rng.gen_range(FALLBACK_LOW..FALLBACK_HIGH),
        }
    }
}
