use std::collections::{HashMap, HashSet};

/// Stable player identifier. Callers provide these; the crate never invents IDs.
pub type PlayerId = i64;

/// A player in the pool. Display attributes are opaque to the ranking logic;
/// only `id` and the optional `team` (pool filter) matter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub team: Option<String>,
}

/// Canonical unordered pair key: the smaller ID always comes first.
///
/// Aggregates are indexed by this key so the same matchup maps to the same
/// row regardless of on-screen left/right orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    lo: PlayerId,
    hi: PlayerId,
}

impl PairKey {
    /// Build the canonical key for two distinct players. Returns `None` when
    /// `a == b` — a player never faces themselves.
    pub fn new(a: PlayerId, b: PlayerId) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(PairKey {
            lo: a.min(b),
            hi: a.max(b),
        })
    }

    pub fn lo(&self) -> PlayerId {
        self.lo
    }

    pub fn hi(&self) -> PlayerId {
        self.hi
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.lo == id || self.hi == id
    }
}

/// Accumulated win counts for one canonical pair.
///
/// Rows are created lazily on the first vote for a matchup, never deleted,
/// and only ever incremented. Invariant: `total == wins_lo + wins_hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairAggregate {
    pub key: PairKey,
    pub wins_lo: u64,
    pub wins_hi: u64,
    pub total: u64,
}

impl PairAggregate {
    /// Fresh zeroed row for a pair.
    pub fn new(key: PairKey) -> Self {
        PairAggregate {
            key,
            wins_lo: 0,
            wins_hi: 0,
            total: 0,
        }
    }

    /// Whether the row satisfies `total == wins_lo + wins_hi`.
    pub fn is_consistent(&self) -> bool {
        self.total == self.wins_lo + self.wins_hi
    }

    /// Credit one win to `winner`, which must be one of the pair's endpoints.
    pub fn record_win(&mut self, winner: PlayerId) {
        debug_assert!(self.key.contains(winner), "winner {} not in pair", winner);
        if winner == self.key.lo {
            self.wins_lo += 1;
            self.total += 1;
        } else if winner == self.key.hi {
            self.wins_hi += 1;
            self.total += 1;
        }
    }

    /// Wins credited to `id`, or `None` if `id` is not an endpoint.
    pub fn wins_for(&self, id: PlayerId) -> Option<u64> {
        if id == self.key.lo {
            Some(self.wins_lo)
        } else if id == self.key.hi {
            Some(self.wins_hi)
        } else {
            None
        }
    }
}

/// Immutable read of the store: the eligible players plus every pair row.
/// All recomputation (scores, exposure) runs off one of these — never off
/// live mutable state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub aggregates: Vec<PairAggregate>,
}

impl Snapshot {
    /// Pool IDs in ascending order. Sorted so downstream computation is
    /// deterministic regardless of how the store returned the rows.
    pub fn pool_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// A completed comparison as submitted by a client. Consumed on write;
/// the core never retains these beyond updating the pair aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vote {
    pub left: PlayerId,
    pub right: PlayerId,
    pub winner: PlayerId,
}

/// Drop aggregate rows that reference players outside the pool or violate
/// the count invariant. Degenerate rows are logged and skipped, never fatal —
/// one bad row must not poison the whole recomputation.
pub(crate) fn usable_aggregates<'a>(
    aggregates: &'a [PairAggregate],
    pool: &HashSet<PlayerId>,
) -> Vec<&'a PairAggregate> {
    let mut kept = Vec::with_capacity(aggregates.len());
    for agg in aggregates {
        if !agg.is_consistent() {
            tracing::warn!(
                lo = agg.key.lo,
                hi = agg.key.hi,
                wins_lo = agg.wins_lo,
                wins_hi = agg.wins_hi,
                total = agg.total,
                "skipping inconsistent pair aggregate",
            );
            continue;
        }
        if !pool.contains(&agg.key.lo) || !pool.contains(&agg.key.hi) {
            // Expected under a narrowed pool filter, anomalous otherwise —
            // the caller can't tell which, so log at debug, not warn.
            tracing::debug!(
                lo = agg.key.lo,
                hi = agg.key.hi,
                "skipping pair aggregate with endpoint outside the pool",
            );
            continue;
        }
        kept.push(agg);
    }
    kept
}

/// Maps between caller-provided IDs and internal 0..N indices.
pub(crate) struct IdMap {
    ids: Vec<PlayerId>,
    id_to_idx: HashMap<PlayerId, usize>,
}

impl IdMap {
    pub fn from_ids(ids: &[PlayerId]) -> Self {
        let mut id_to_idx = HashMap::with_capacity(ids.len());
        for (idx, &id) in ids.iter().enumerate() {
            let prev = id_to_idx.insert(id, idx);
            assert!(prev.is_none(), "Duplicate player ID: {}", id);
        }
        IdMap {
            ids: ids.to_vec(),
            id_to_idx,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, id: PlayerId) -> Option<usize> {
        self.id_to_idx.get(&id).copied()
    }

    pub fn to_id(&self, idx: usize) -> PlayerId {
        self.ids[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_canonical_order() {
        let a = PairKey::new(7, 3).unwrap();
        let b = PairKey::new(3, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.lo(), 3);
        assert_eq!(a.hi(), 7);
    }

    #[test]
    fn test_pair_key_rejects_self_pair() {
        assert!(PairKey::new(5, 5).is_none());
    }

    #[test]
    fn test_record_win_updates_correct_side() {
        let key = PairKey::new(1, 2).unwrap();
        let mut agg = PairAggregate::new(key);
        agg.record_win(2);
        agg.record_win(2);
        agg.record_win(1);
        assert_eq!(agg.wins_lo, 1);
        assert_eq!(agg.wins_hi, 2);
        assert_eq!(agg.total, 3);
        assert!(agg.is_consistent());
        assert_eq!(agg.wins_for(1), Some(1));
        assert_eq!(agg.wins_for(2), Some(2));
        assert_eq!(agg.wins_for(3), None);
    }

    #[test]
    fn test_usable_aggregates_skips_degenerate_rows() {
        let pool: HashSet<PlayerId> = [1, 2, 3].into_iter().collect();

        let mut good = PairAggregate::new(PairKey::new(1, 2).unwrap());
        good.record_win(1);

        // Count invariant violated
        let mut broken = PairAggregate::new(PairKey::new(2, 3).unwrap());
        broken.wins_lo = 5;
        broken.total = 2;

        // References a player outside the pool
        let mut foreign = PairAggregate::new(PairKey::new(1, 99).unwrap());
        foreign.record_win(1);

        let all = vec![good, broken, foreign];
        let kept = usable_aggregates(&all, &pool);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].key, good.key);
    }

    #[test]
    #[should_panic(expected = "Duplicate player ID")]
    fn test_id_map_rejects_duplicates() {
        let _ = IdMap::from_ids(&[1, 2, 1]);
    }
}
