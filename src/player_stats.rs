use chrono::NaiveDate;

use crate::enrich::{DatasetSnapshot, MatchRow};

const FINAL_ROUND: &str = "The Final";
/// Alternate label some seasons use for the title match.
const FINAL_ROUND_SHORT: &str = "Final";
const GRAND_SLAM_SERIES: &str = "Grand Slam";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareerSummary {
    pub matches: u32,
    pub wins: u32,
    /// Final-round wins across all series.
    pub tour_titles: u32,
    /// Final-round wins within the Grand Slam series.
    pub grand_slams: u32,
}

/// Career totals for one player, `None` when the identifier never appears
/// in the dataset (or is blank).
pub fn player_career_summary(snapshot: &DatasetSnapshot, player: &str) -> Option<CareerSummary> {
    let player = normalized(player)?;

    let mut summary = CareerSummary {
        matches: 0,
        wins: 0,
        tour_titles: 0,
        grand_slams: 0,
    };
    for row in snapshot.matches.iter().filter(|row| row.involves(player)) {
        summary.matches += 1;
        if row.winner == player {
            summary.wins += 1;
            if is_final(&row.round) {
                summary.tour_titles += 1;
                if row.series == GRAND_SLAM_SERIES {
                    summary.grand_slams += 1;
                }
            }
        }
    }
    (summary.matches > 0).then_some(summary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub tournament: String,
    pub round: String,
    pub opponent: String,
    pub score: String,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone)]
pub struct PlayerTimeline {
    /// Tournaments in first-encounter order along the season, for axis
    /// ordering in the rendering collaborator.
    pub tournaments: Vec<String>,
    /// Chronological entries.
    pub entries: Vec<TimelineEntry>,
}

/// One player's matches in one year, chronological, tagged win/loss from
/// the player's perspective. `None` when the player has no matches that
/// year.
pub fn player_timeline(
    snapshot: &DatasetSnapshot,
    player: &str,
    year: i32,
) -> Option<PlayerTimeline> {
    let player = normalized(player)?;

    let mut rows: Vec<&MatchRow> = snapshot
        .matches
        .iter()
        .filter(|row| row.year == year && row.involves(player))
        .collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by_key(|row| row.date);

    let mut tournaments: Vec<String> = Vec::new();
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if !tournaments.iter().any(|t| *t == row.tournament) {
            tournaments.push(row.tournament.clone());
        }
        let opponent = if row.player_1 == player {
            row.player_2.clone()
        } else {
            row.player_1.clone()
        };
        entries.push(TimelineEntry {
            date: row.date,
            tournament: row.tournament.clone(),
            round: row.round.clone(),
            opponent,
            score: row.score.clone(),
            outcome: if row.winner == player {
                MatchOutcome::Win
            } else {
                MatchOutcome::Loss
            },
        });
    }
    Some(PlayerTimeline {
        tournaments,
        entries,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceWinRate {
    pub surface: String,
    pub matches: u32,
    pub wins: u32,
    /// `wins / matches * 100`, always within [0, 100].
    pub win_pct: f64,
}

/// Win percentage per surface, only over surfaces the player actually
/// appeared on. `None` when the player has no matches at all.
pub fn player_surface_win_rate(
    snapshot: &DatasetSnapshot,
    player: &str,
) -> Option<Vec<SurfaceWinRate>> {
    let player = normalized(player)?;

    let mut rates: Vec<SurfaceWinRate> = Vec::new();
    for row in snapshot.matches.iter().filter(|row| row.involves(player)) {
        let idx = match rates.iter().position(|r| r.surface == row.surface) {
            Some(idx) => idx,
            None => {
                rates.push(SurfaceWinRate {
                    surface: row.surface.clone(),
                    matches: 0,
                    wins: 0,
                    win_pct: 0.0,
                });
                rates.len() - 1
            }
        };
        rates[idx].matches += 1;
        if row.winner == player {
            rates[idx].wins += 1;
        }
    }
    if rates.is_empty() {
        return None;
    }
    for rate in &mut rates {
        rate.win_pct = f64::from(rate.wins) / f64::from(rate.matches) * 100.0;
    }
    Some(rates)
}

fn is_final(round: &str) -> bool {
    round == FINAL_ROUND || round == FINAL_ROUND_SHORT
}

/// Blank identifiers are "cannot compute", not "match everything".
fn normalized(player: &str) -> Option<&str> {
    let trimmed = player.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
