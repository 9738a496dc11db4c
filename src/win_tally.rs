use std::collections::HashMap;

use chrono::NaiveDate;

use crate::enrich::{DatasetSnapshot, MatchRow};

/// Ranked tallies are capped for the "top players" display.
pub const TALLY_LIMIT: usize = 15;

/// Category/date selection shared by the tally and breakdown queries.
/// An empty set on any dimension means "nothing selected", not "all":
/// such a filter matches no rows.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub surfaces: Vec<String>,
    pub series: Vec<String>,
    pub courts: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl CategoryFilter {
    /// A filter with an unset dimension cannot compute anything.
    pub fn is_complete(&self) -> bool {
        !self.surfaces.is_empty()
            && !self.series.is_empty()
            && !self.courts.is_empty()
            && self.date_from.is_some()
            && self.date_to.is_some()
    }

    pub fn matches(&self, row: &MatchRow) -> bool {
        let (Some(from), Some(to)) = (self.date_from, self.date_to) else {
            return false;
        };
        self.surfaces.iter().any(|s| *s == row.surface)
            && self.series.iter().any(|s| *s == row.series)
            && self.courts.iter().any(|c| *c == row.court)
            && row.date >= from
            && row.date <= to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinTallyRow {
    pub player: String,
    pub wins: u32,
}

/// Win counts per player over the filtered rows, descending, capped to
/// [`TALLY_LIMIT`]. Ties keep first-encounter order. An incomplete filter
/// yields an empty tally.
pub fn filtered_win_tally(snapshot: &DatasetSnapshot, filter: &CategoryFilter) -> Vec<WinTallyRow> {
    if !filter.is_complete() {
        return Vec::new();
    }

    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<WinTallyRow> = Vec::new();
    for row in snapshot.matches.iter().filter(|row| filter.matches(row)) {
        match order.get(row.winner.as_str()) {
            Some(&idx) => rows[idx].wins += 1,
            None => {
                order.insert(row.winner.as_str(), rows.len());
                rows.push(WinTallyRow {
                    player: row.winner.clone(),
                    wins: 1,
                });
            }
        }
    }

    // Stable sort keeps encounter order within equal counts.
    rows.sort_by(|a, b| b.wins.cmp(&a.wins));
    rows.truncate(TALLY_LIMIT);
    rows
}

#[derive(Debug, Clone)]
pub struct SetsCount {
    pub sets_needed: u8,
    pub matches: u32,
}

#[derive(Debug, Clone)]
pub struct RoundGroup {
    pub round: String,
    pub matches: u32,
    pub sets: Vec<SetsCount>,
}

#[derive(Debug, Clone)]
pub struct SurfaceGroup {
    pub surface: String,
    pub matches: u32,
    pub rounds: Vec<RoundGroup>,
}

/// Hierarchical surface → round → sets-needed counts over the filtered
/// rows, for the drill-down chart collaborator. `None` when nothing
/// survives the filter (or the filter is incomplete).
pub fn category_breakdown(
    snapshot: &DatasetSnapshot,
    filter: &CategoryFilter,
) -> Option<Vec<SurfaceGroup>> {
    if !filter.is_complete() {
        return None;
    }

    let mut groups: Vec<SurfaceGroup> = Vec::new();
    for row in snapshot.matches.iter().filter(|row| filter.matches(row)) {
        let s_idx = match groups.iter().position(|g| g.surface == row.surface) {
            Some(idx) => idx,
            None => {
                groups.push(SurfaceGroup {
                    surface: row.surface.clone(),
                    matches: 0,
                    rounds: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let surface = &mut groups[s_idx];
        surface.matches += 1;

        let r_idx = match surface.rounds.iter().position(|r| r.round == row.round) {
            Some(idx) => idx,
            None => {
                surface.rounds.push(RoundGroup {
                    round: row.round.clone(),
                    matches: 0,
                    sets: Vec::new(),
                });
                surface.rounds.len() - 1
            }
        };
        let round = &mut surface.rounds[r_idx];
        round.matches += 1;

        match round.sets.iter_mut().find(|s| s.sets_needed == row.sets_needed) {
            Some(s) => s.matches += 1,
            None => round.sets.push(SetsCount {
                sets_needed: row.sets_needed,
                matches: 1,
            }),
        }
    }

    if groups.is_empty() { None } else { Some(groups) }
}
