/// Snapshot -> score map. Pure function — no IO, no state, no randomness.
///
/// Scores are "average probability of beating a uniformly random other
/// player in the pool", always strictly inside (0, 1) once there is any
/// evidence, and exactly 0.5 everywhere when there is none.
use std::collections::{HashMap, HashSet};

use crate::bradley_terry::{BradleyTerry, IndexedAggregate};
use crate::constants::{CONVERGENCE_TOLERANCE, DEFAULT_PRIOR, MAX_ITERATIONS};
use crate::types::{usable_aggregates, IdMap, PairAggregate, PlayerId};

/// Tunables for the rating fit. The prior magnitude materially changes
/// cold-start behavior, so it is configuration, not a baked-in constant.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingConfig {
    /// Smoothing pseudocount per observed pair direction.
    pub prior: f64,
    /// MM iteration budget.
    pub max_iterations: usize,
    /// Early-exit tolerance on relative strength change.
    pub tolerance: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            prior: DEFAULT_PRIOR,
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOLERANCE,
        }
    }
}

/// Fit latent strengths from the pool's aggregates and transform them to
/// bounded comparison scores.
///
/// Aggregates whose endpoints fall outside `pool`, or which violate the
/// count invariant, are skipped (see `usable_aggregates`). With fewer than
/// two players or zero recorded votes, every player scores 0.5.
pub fn compute_scores(
    pool: &[PlayerId],
    aggregates: &[PairAggregate],
    config: &RatingConfig,
) -> HashMap<PlayerId, f64> {
    let id_map = IdMap::from_ids(pool);
    let n = id_map.len();

    if n < 2 {
        return pool.iter().map(|&id| (id, 0.5)).collect();
    }

    let pool_set: HashSet<PlayerId> = pool.iter().copied().collect();
    let indexed: Vec<IndexedAggregate> = usable_aggregates(aggregates, &pool_set)
        .into_iter()
        .map(|agg| {
            // usable_aggregates guarantees both endpoints are in the pool
            let lo = id_map.get(agg.key.lo()).expect("endpoint in pool");
            let hi = id_map.get(agg.key.hi()).expect("endpoint in pool");
            (lo, hi, agg.wins_lo, agg.wins_hi)
        })
        .collect();

    let mut bt = BradleyTerry::new(n, &indexed, config.prior);
    if !bt.has_evidence() {
        return pool.iter().map(|&id| (id, 0.5)).collect();
    }

    bt.fit(config.max_iterations, config.tolerance);
    let strengths = bt.strengths();

    // score(i) = mean over j != i of w_i / (w_i + w_j). Monotonic in w_i,
    // but directly interpretable as a beat probability.
    let mut scores = HashMap::with_capacity(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            if j == i {
                continue;
            }
            let denom = strengths[i] + strengths[j];
            sum += if denom > 0.0 {
                strengths[i] / denom
            } else {
                0.5
            };
        }
        scores.insert(id_map.to_id(i), sum / (n - 1) as f64);
    }
    scores
}

/// Score map -> ranked list, best first. Ties broken by ID so output order
/// is stable.
pub fn ranked(scores: &HashMap<PlayerId, f64>) -> Vec<(PlayerId, f64)> {
    let mut entries: Vec<(PlayerId, f64)> = scores.iter().map(|(&id, &s)| (id, s)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PairKey;

    fn agg(a: PlayerId, b: PlayerId, wins_a: u64, wins_b: u64) -> PairAggregate {
        let key = PairKey::new(a, b).unwrap();
        // Map the caller's (a, b) orientation onto the canonical key.
        let (wins_lo, wins_hi) = if key.lo() == a {
            (wins_a, wins_b)
        } else {
            (wins_b, wins_a)
        };
        PairAggregate {
            key,
            wins_lo,
            wins_hi,
            total: wins_lo + wins_hi,
        }
    }

    #[test]
    fn test_no_evidence_all_half() {
        let pool = vec![1, 2, 3];
        let scores = compute_scores(&pool, &[], &RatingConfig::default());
        for id in pool {
            assert_eq!(scores[&id], 0.5);
        }
    }

    #[test]
    fn test_zero_total_aggregates_count_as_no_evidence() {
        let pool = vec![1, 2];
        let empty = PairAggregate::new(PairKey::new(1, 2).unwrap());
        let scores = compute_scores(&pool, &[empty], &RatingConfig::default());
        assert_eq!(scores[&1], 0.5);
        assert_eq!(scores[&2], 0.5);
    }

    #[test]
    fn test_pool_of_one_defaults() {
        let scores = compute_scores(&[42], &[], &RatingConfig::default());
        assert_eq!(scores[&42], 0.5);
    }

    #[test]
    fn test_shutout_orders_pair_and_stays_bounded() {
        let pool = vec![1, 2];
        let scores = compute_scores(&pool, &[agg(1, 2, 10, 0)], &RatingConfig::default());
        assert!(scores[&1] > scores[&2]);
        for id in pool {
            assert!(scores[&id] > 0.0 && scores[&id] < 1.0);
        }
    }

    #[test]
    fn test_scaling_counts_at_fixed_ratio_is_monotone() {
        let config = RatingConfig::default();
        let mut previous = 0.0;
        for scale in [1, 10, 100, 1000] {
            let scores = compute_scores(&[1, 2], &[agg(1, 2, 10 * scale, 0)], &config);
            assert!(
                scores[&1] > previous,
                "score should strictly increase with more one-sided evidence"
            );
            assert!(scores[&1] < 1.0);
            previous = scores[&1];
        }
    }

    #[test]
    fn test_transitive_propagation() {
        // A beats B 8/10, B beats C 8/10, no direct A-C votes.
        let pool = vec![1, 2, 3];
        let aggregates = vec![agg(1, 2, 8, 2), agg(2, 3, 8, 2)];
        let scores = compute_scores(&pool, &aggregates, &RatingConfig::default());
        assert!(scores[&1] > scores[&2]);
        assert!(scores[&2] > scores[&3]);
    }

    #[test]
    fn test_bit_identical_determinism() {
        let pool = vec![10, 20, 30, 40];
        let aggregates = vec![agg(10, 20, 7, 3), agg(20, 30, 5, 5), agg(30, 40, 2, 9)];
        let config = RatingConfig::default();
        let a = compute_scores(&pool, &aggregates, &config);
        let b = compute_scores(&pool, &aggregates, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_left_right_orientation_is_irrelevant() {
        // Same matchup recorded through both orientations must canonicalize
        // to identical evidence.
        let config = RatingConfig::default();
        let forward = compute_scores(&[1, 2], &[agg(1, 2, 8, 2)], &config);
        let reversed = compute_scores(&[1, 2], &[agg(2, 1, 2, 8)], &config);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_degenerate_rows_are_skipped() {
        let pool = vec![1, 2];
        let mut broken = agg(1, 2, 3, 3);
        broken.total = 99; // invariant violated

        // Only the broken row: treated as no evidence at all.
        let scores = compute_scores(&pool, &[broken], &RatingConfig::default());
        assert_eq!(scores[&1], 0.5);

        // Broken row alongside a good one: good row still counts.
        let scores = compute_scores(&pool, &[broken, agg(1, 2, 10, 0)], &RatingConfig::default());
        assert!(scores[&1] > scores[&2]);
    }

    #[test]
    fn test_unobserved_player_sits_between_extremes() {
        // Player 3 has no votes; with 1 crushing 2 they should land between.
        let pool = vec![1, 2, 3];
        let scores = compute_scores(&pool, &[agg(1, 2, 20, 0)], &RatingConfig::default());
        assert!(scores[&1] > scores[&3]);
        assert!(scores[&3] > scores[&2]);
    }

    #[test]
    fn test_ranked_is_sorted_with_stable_ties() {
        let mut scores = HashMap::new();
        scores.insert(3, 0.5);
        scores.insert(1, 0.9);
        scores.insert(2, 0.5);
        let order: Vec<PlayerId> = ranked(&scores).into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
