/// Per-player observation counts, derived from the aggregate snapshot.
///
/// Recomputed alongside the rating fit on every refresh, never updated
/// incrementally. The sampler uses these counts to pull under-observed
/// players into more matchups.
use std::collections::{HashMap, HashSet};

use crate::types::{usable_aggregates, PairAggregate, PlayerId};

/// Sum of `total` across all aggregates containing each pool member,
/// restricted to aggregates whose both endpoints lie in the pool. Every
/// pool member appears in the result, at zero if unobserved.
pub fn exposure_counts(
    pool: &[PlayerId],
    aggregates: &[PairAggregate],
) -> HashMap<PlayerId, u64> {
    let pool_set: HashSet<PlayerId> = pool.iter().copied().collect();
    let mut counts: HashMap<PlayerId, u64> = pool.iter().map(|&id| (id, 0)).collect();

    for agg in usable_aggregates(aggregates, &pool_set) {
        *counts.entry(agg.key.lo()).or_insert(0) += agg.total;
        *counts.entry(agg.key.hi()).or_insert(0) += agg.total;
    }
    counts
}
