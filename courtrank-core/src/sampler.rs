/// Pair selection: who faces off next.
///
/// Biases the first pick toward under-observed players and remembers
/// recently shown pairs so the same matchup doesn't repeat back-to-back.
/// All state here is session-local — nothing is shared across clients and
/// nothing is persisted.
use std::collections::HashMap;
use std::collections::VecDeque;

use rand::Rng;

use crate::constants::{
    DEFAULT_COOLDOWN_CAPACITY, DEFAULT_EXPLORE_PROBABILITY, MAX_SAMPLE_RETRIES,
    UNDEREXPOSED_FRACTION,
};
use crate::error::SampleError;
use crate::types::{PairKey, PlayerId};

/// Sampler tunables.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerConfig {
    /// Probability the first player comes from the underexposed slice.
    pub explore_probability: f64,
    /// Fraction of the pool (by ascending exposure) treated as underexposed.
    pub underexposed_fraction: f64,
    /// Cooldown memory size. 0 disables cooldown entirely.
    pub cooldown_capacity: usize,
    /// Redraw budget on cooldown collisions before accepting anyway.
    pub max_retries: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            explore_probability: DEFAULT_EXPLORE_PROBABILITY,
            underexposed_fraction: UNDEREXPOSED_FRACTION,
            cooldown_capacity: DEFAULT_COOLDOWN_CAPACITY,
            max_retries: MAX_SAMPLE_RETRIES,
        }
    }
}

/// Bounded, ordered memory of recently shown pairs. Most recent at the
/// front; oldest evicted off the back once capacity is exceeded.
#[derive(Debug)]
pub struct CooldownMemory {
    entries: VecDeque<PairKey>,
    capacity: usize,
}

impl CooldownMemory {
    pub fn new(capacity: usize) -> Self {
        CooldownMemory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, key: PairKey) -> bool {
        self.entries.contains(&key)
    }

    /// Record a shown pair, evicting the oldest entry beyond capacity.
    pub fn remember(&mut self, key: PairKey) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(key);
        self.entries.truncate(self.capacity);
    }

    /// Forget everything. Called when the pool changes: stale keys may
    /// reference unreachable pairs, or cover a disproportionate share of a
    /// smaller pool.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Chooses the next unordered pair from the pool.
pub struct PairSampler {
    cooldown: CooldownMemory,
    config: SamplerConfig,
}

impl PairSampler {
    pub fn new(config: SamplerConfig) -> Self {
        let cooldown = CooldownMemory::new(config.cooldown_capacity);
        PairSampler { cooldown, config }
    }

    /// Draw the next pair.
    ///
    /// The first player is drawn from the underexposed slice with
    /// `explore_probability`, otherwise uniformly; the second uniformly from
    /// the whole pool. Pairs still in cooldown are redrawn up to
    /// `max_retries` times, then accepted anyway — with a tiny pool every
    /// pair is eventually in cooldown and the sampler must not livelock.
    ///
    /// Returns players in draw order; callers canonicalize for storage.
    pub fn next_pair(
        &mut self,
        pool: &[PlayerId],
        exposure: &HashMap<PlayerId, u64>,
        rng: &mut impl Rng,
    ) -> Result<(PlayerId, PlayerId), SampleError> {
        let n = pool.len();
        if n < 2 {
            return Err(SampleError::PoolTooSmall { size: n });
        }

        // Ascending by exposure, ties by ID so the slice is deterministic.
        let mut by_exposure: Vec<PlayerId> = pool.to_vec();
        by_exposure.sort_unstable_by_key(|id| (exposure.get(id).copied().unwrap_or(0), *id));

        let k = ((self.config.underexposed_fraction * n as f64).ceil() as usize)
            .max(2)
            .min(n);
        let underexposed = &by_exposure[..k];

        let mut chosen = None;
        for attempt in 0..=self.config.max_retries {
            let first = if rng.random::<f64>() < self.config.explore_probability {
                underexposed[rng.random_range(0..underexposed.len())]
            } else {
                pool[rng.random_range(0..n)]
            };

            let mut second = pool[rng.random_range(0..n)];
            while second == first {
                second = pool[rng.random_range(0..n)];
            }

            let key = PairKey::new(first, second).expect("sampler drew distinct players");
            if !self.cooldown.contains(key) || attempt == self.config.max_retries {
                chosen = Some((first, second, key));
                break;
            }
        }

        // The retry loop always terminates with a pair: the final attempt
        // accepts unconditionally.
        let (first, second, key) = chosen.expect("bounded retry loop always yields a pair");
        self.cooldown.remember(key);
        Ok((first, second))
    }

    /// Drop all cooldown state. Must be called whenever the pool changes.
    pub fn reset_cooldown(&mut self) {
        self.cooldown.clear();
    }

    pub fn cooldown(&self) -> &CooldownMemory {
        &self.cooldown
    }
}
