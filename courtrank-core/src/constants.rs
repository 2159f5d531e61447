/// Smoothing pseudocount added to both win directions of every observed pair.
/// Keeps strengths finite for undefeated (or always-losing) players. Added
/// per observed pair only — pairs with zero recorded votes get nothing, so
/// cold-start scores stay at the no-evidence default.
pub const DEFAULT_PRIOR: f64 = 0.5;

/// Iteration budget for the Bradley-Terry MM fit. Convergence usually hits
/// the tolerance long before this on realistic vote volumes.
pub const MAX_ITERATIONS: usize = 200;

/// Early-exit tolerance on the maximum relative strength change between
/// iterations. Purely an efficiency knob, not needed for correctness.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-9;

/// How many recently shown pairs the sampler remembers to avoid immediate
/// repeats. Session-scoped, never persisted.
pub const DEFAULT_COOLDOWN_CAPACITY: usize = 50;

/// Probability that the first player of a pair is drawn from the
/// underexposed slice of the pool rather than uniformly.
pub const DEFAULT_EXPLORE_PROBABILITY: f64 = 0.7;

/// Fraction of the pool (ordered by exposure, ascending) that counts as
/// underexposed. Always at least 2 players.
pub const UNDEREXPOSED_FRACTION: f64 = 0.25;

/// How many times the sampler redraws on a cooldown collision before
/// accepting the pair anyway. The fallback is a hard requirement: with a
/// 2-player pool every pair is eventually in cooldown.
pub const MAX_SAMPLE_RETRIES: usize = 50;

/// Default refresh interval for callers that poll the store instead of
/// subscribing to change notifications.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
