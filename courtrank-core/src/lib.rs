/// courtrank-core: pairwise-vote ranking engine.
///
/// Votes accumulate into per-pair win counts; from each snapshot of those
/// counts the crate fits Bradley-Terry strengths (MM algorithm) and turns
/// them into bounded scores — "probability this player beats a uniformly
/// random other player." A sampler picks the next matchup, biased toward
/// under-observed players and away from recently shown pairs.
///
/// The rating, exposure, and sampling layers are pure and synchronous; the
/// only suspension points are the two store operations (snapshot read, vote
/// write) behind the `AggregateStore` trait.
///
/// # Quick start
///
/// ```rust
/// use courtrank_core::{compute_scores, PairAggregate, PairKey, RatingConfig};
///
/// let pool = vec![1, 2, 3];
///
/// // Player 1 beat player 2 three times.
/// let mut agg = PairAggregate::new(PairKey::new(1, 2).unwrap());
/// agg.record_win(1);
/// agg.record_win(1);
/// agg.record_win(1);
///
/// let scores = compute_scores(&pool, &[agg], &RatingConfig::default());
/// assert!(scores[&1] > scores[&2]);
/// assert!(scores.values().all(|&s| s > 0.0 && s < 1.0));
/// ```

pub mod bradley_terry;
pub mod constants;
pub mod error;
pub mod exposure;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod store;
pub mod types;

// Re-export primary public API at crate root.
pub use error::{SampleError, StoreError};
pub use exposure::exposure_counts;
pub use sampler::{CooldownMemory, PairSampler, SamplerConfig};
pub use scoring::{compute_scores, ranked, RatingConfig};
pub use session::{RankingSession, DEFAULT_POLL_INTERVAL};
pub use store::{validate_vote, AggregateStore, MemoryStore};
pub use types::{PairAggregate, PairKey, Player, PlayerId, Snapshot, Vote};
