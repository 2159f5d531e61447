use crate::types::PlayerId;

/// Store-boundary failures. Reads and writes are the only two suspension
/// points in the core; everything else is pure computation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Snapshot fetch failed. Callers keep their last-known-good scores and
    /// retry; ranking state is never torn down over a failed read.
    #[error("snapshot read failed: {reason}")]
    Read { reason: String },

    /// Vote write failed. The vote is not counted and no local state may be
    /// mutated as if it had been.
    #[error("vote write failed: {reason}")]
    Write { reason: String },

    /// A vote referenced a player the store has never heard of.
    #[error("unknown player id {id}")]
    UnknownPlayer { id: PlayerId },

    /// The winner was not one of the two displayed players, or the two
    /// sides were the same player.
    #[error("invalid vote: winner {winner} for pair ({left}, {right})")]
    InvalidVote {
        left: PlayerId,
        right: PlayerId,
        winner: PlayerId,
    },
}

/// Sampler failures. Informational, not fatal — the caller surfaces the
/// state and waits for the pool to grow.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("pool has {size} eligible players, need at least 2")]
    PoolTooSmall { size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_texts_carry_context() {
        let err = StoreError::Read { reason: "store offline".into() };
        assert_eq!(err.to_string(), "snapshot read failed: store offline");

        let err = StoreError::UnknownPlayer { id: 42 };
        assert_eq!(err.to_string(), "unknown player id 42");

        let err = StoreError::InvalidVote { left: 1, right: 2, winner: 9 };
        assert_eq!(err.to_string(), "invalid vote: winner 9 for pair (1, 2)");

        let err = SampleError::PoolTooSmall { size: 1 };
        assert_eq!(err.to_string(), "pool has 1 eligible players, need at least 2");
    }

    #[test]
    fn test_sample_error_is_comparable() {
        // Callers assert on the exact variant when surfacing pool state.
        assert_eq!(
            SampleError::PoolTooSmall { size: 0 },
            SampleError::PoolTooSmall { size: 0 },
        );
        assert_ne!(
            SampleError::PoolTooSmall { size: 0 },
            SampleError::PoolTooSmall { size: 1 },
        );
    }
}
