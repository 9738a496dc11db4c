use std::collections::BTreeMap;

use crate::enrich::DatasetSnapshot;

/// Winner-odds histograms bucket at this width, anchored at 1.0.
pub const BUCKET_WIDTH: f64 = 0.1;
const BUCKET_START: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDimension {
    Surface,
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsBucket {
    /// Inclusive lower edge; the bucket covers `[lower, lower + BUCKET_WIDTH)`.
    pub lower: f64,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct CategoryHistogram {
    pub category: String,
    /// Non-empty buckets only, ascending by lower edge. Kept sparse so a
    /// stray extreme odd costs one bucket, not a dense range up to it.
    pub buckets: Vec<OddsBucket>,
}

/// Winner-odds histogram per category over the decided-odds subset.
/// Returns `None` when no winner odds could be determined at all, which is
/// distinct from a zero-count histogram.
pub fn odds_distribution(
    snapshot: &DatasetSnapshot,
    dimension: CategoryDimension,
) -> Option<Vec<CategoryHistogram>> {
    if snapshot.decided.is_empty() {
        return None;
    }

    // Category order is first-encounter; counts accumulate per bucket slot.
    let mut order: Vec<String> = Vec::new();
    let mut counts: Vec<BTreeMap<u64, u32>> = Vec::new();
    for row in snapshot.decided_rows() {
        let Some(odd) = row.winner_odd else { continue };
        let category = match dimension {
            CategoryDimension::Surface => row.surface.as_str(),
            CategoryDimension::Series => row.series.as_str(),
        };
        let idx = match order.iter().position(|c| c == category) {
            Some(idx) => idx,
            None => {
                order.push(category.to_string());
                counts.push(BTreeMap::new());
                order.len() - 1
            }
        };
        *counts[idx].entry(bucket_slot(odd)).or_insert(0) += 1;
    }

    let histograms = order
        .into_iter()
        .zip(counts)
        .map(|(category, slots)| CategoryHistogram {
            category,
            buckets: slots
                .into_iter()
                .map(|(slot, count)| OddsBucket {
                    lower: BUCKET_START + BUCKET_WIDTH * slot as f64,
                    count,
                })
                .collect(),
        })
        .collect();
    Some(histograms)
}

/// Bucket index for an odd; the `as` cast saturates, so even absurd quotes
/// map to a single valid slot.
fn bucket_slot(odd: f64) -> u64 {
    ((odd - BUCKET_START) / BUCKET_WIDTH).floor().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::bucket_slot;

    #[test]
    fn slots_align_to_tenth_wide_buckets_from_one() {
        assert_eq!(bucket_slot(1.0), 0);
        assert_eq!(bucket_slot(1.05), 0);
        assert_eq!(bucket_slot(1.35), 3);
        assert_eq!(bucket_slot(1.39), 3);
        assert_eq!(bucket_slot(3.0), 20);
    }

    #[test]
    fn extreme_odds_map_to_a_finite_slot() {
        assert!(bucket_slot(1e9) < u64::MAX);
        assert_eq!(bucket_slot(f64::MAX), u64::MAX);
        assert_eq!(bucket_slot(0.5), 0);
    }
}
