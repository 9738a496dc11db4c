use chrono::NaiveDate;

use crate::enrich::{DatasetSnapshot, MatchRow};

#[derive(Debug, Clone)]
pub struct Meeting {
    pub date: NaiveDate,
    pub tournament: String,
    pub round: String,
    pub surface: String,
    pub score: String,
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCount {
    pub round: String,
    pub matches: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsPoint {
    pub date: NaiveDate,
    pub odd: f64,
}

#[derive(Debug, Clone)]
pub struct HeadToHeadReport {
    pub player_a: String,
    pub player_b: String,
    pub total_matches: u32,
    pub wins_a: u32,
    pub wins_b: u32,
    /// Shared matches, most recent first.
    pub meetings: Vec<Meeting>,
    /// How often the pair met per round, first-encounter order.
    pub rounds: Vec<RoundCount>,
    /// Each player's quoted odds across the shared matches, chronological.
    pub odds_a: Vec<OddsPoint>,
    pub odds_b: Vec<OddsPoint>,
}

/// Head-to-head record between two named players. `None` when either name
/// is blank or the pair never met. `a == b` is a valid degenerate input:
/// it selects rows where both listed participants equal `a`.
pub fn head_to_head(snapshot: &DatasetSnapshot, a: &str, b: &str) -> Option<HeadToHeadReport> {
    let a = trimmed(a)?;
    let b = trimmed(b)?;

    let mut shared: Vec<&MatchRow> = snapshot
        .matches
        .iter()
        .filter(|row| {
            (row.player_1 == a && row.player_2 == b) || (row.player_1 == b && row.player_2 == a)
        })
        .collect();
    if shared.is_empty() {
        return None;
    }
    shared.sort_by_key(|row| row.date);

    let mut wins_a = 0;
    let mut wins_b = 0;
    let mut rounds: Vec<RoundCount> = Vec::new();
    let mut odds_a = Vec::with_capacity(shared.len());
    let mut odds_b = Vec::with_capacity(shared.len());
    for row in &shared {
        if row.winner == a {
            wins_a += 1;
        }
        if row.winner == b {
            wins_b += 1;
        }
        match rounds.iter_mut().find(|r| r.round == row.round) {
            Some(r) => r.matches += 1,
            None => rounds.push(RoundCount {
                round: row.round.clone(),
                matches: 1,
            }),
        }
        if let Some(odd) = row.odd_for(a) {
            odds_a.push(OddsPoint {
                date: row.date,
                odd,
            });
        }
        if let Some(odd) = row.odd_for(b) {
            odds_b.push(OddsPoint {
                date: row.date,
                odd,
            });
        }
    }

    let meetings = shared
        .iter()
        .rev()
        .map(|row| Meeting {
            date: row.date,
            tournament: row.tournament.clone(),
            round: row.round.clone(),
            surface: row.surface.clone(),
            score: row.score.clone(),
            winner: row.winner.clone(),
        })
        .collect();

    Some(HeadToHeadReport {
        player_a: a.to_string(),
        player_b: b.to_string(),
        total_matches: shared.len() as u32,
        wins_a,
        wins_b,
        meetings,
        rounds,
        odds_a,
        odds_b,
    })
}

fn trimmed(name: &str) -> Option<&str> {
    let t = name.trim();
    (!t.is_empty()).then_some(t)
}
