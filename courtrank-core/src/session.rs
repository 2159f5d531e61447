/// Session orchestrator: snapshot -> recompute -> sample -> vote -> refresh.
///
/// Owns the session-local pieces (cooldown, current score/exposure maps) and
/// drives the store boundary. The store stays the single source of truth: a
/// vote only changes local state after a confirmed write and a fresh
/// snapshot read — there is no optimistic patching.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::DEFAULT_POLL_INTERVAL_SECS;
use crate::error::{SampleError, StoreError};
use crate::exposure::exposure_counts;
use crate::sampler::{PairSampler, SamplerConfig};
use crate::scoring::{compute_scores, RatingConfig};
use crate::store::AggregateStore;
use crate::types::{Player, PlayerId, Vote};

/// How often callers without change notifications should re-read the store.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS);

pub struct RankingSession<S: AggregateStore> {
    store: Arc<S>,
    team_filter: Option<String>,
    rating_config: RatingConfig,
    sampler: PairSampler,

    // Last-known-good view, replaced wholesale on each successful refresh.
    players: Vec<Player>,
    pool: Vec<PlayerId>,
    scores: HashMap<PlayerId, f64>,
    exposure: HashMap<PlayerId, u64>,
}

impl<S: AggregateStore> RankingSession<S> {
    /// Build an empty session. Call `refresh()` before sampling pairs.
    pub fn new(
        store: Arc<S>,
        team_filter: Option<String>,
        rating_config: RatingConfig,
        sampler_config: SamplerConfig,
    ) -> Self {
        RankingSession {
            store,
            team_filter,
            rating_config,
            sampler: PairSampler::new(sampler_config),
            players: Vec::new(),
            pool: Vec::new(),
            scores: HashMap::new(),
            exposure: HashMap::new(),
        }
    }

    /// Read a fresh snapshot and recompute scores and exposure wholesale.
    ///
    /// On a failed read nothing local changes — the previous view stays in
    /// place and the caller may retry.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let snapshot = self.store.snapshot(self.team_filter.as_deref()).await?;

        let pool = snapshot.pool_ids();
        let scores = compute_scores(&pool, &snapshot.aggregates, &self.rating_config);
        let exposure = exposure_counts(&pool, &snapshot.aggregates);

        tracing::debug!(
            pool = pool.len(),
            aggregates = snapshot.aggregates.len(),
            "recomputed ranking view",
        );

        self.players = snapshot.players;
        self.pool = pool;
        self.scores = scores;
        self.exposure = exposure;
        Ok(())
    }

    /// Pick the next matchup from the current view.
    pub fn next_pair(&mut self) -> Result<(Player, Player), SampleError> {
        let mut rng = rand::rng();
        let (a, b) = self.sampler.next_pair(&self.pool, &self.exposure, &mut rng)?;
        let find = |id: PlayerId| {
            self.players
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .expect("sampled id came from the pool")
        };
        Ok((find(a), find(b)))
    }

    /// Record a completed comparison, then re-read the store so scores,
    /// exposure, and sampling all see the new vote. On a failed write the
    /// vote is not counted anywhere.
    pub async fn record_vote(
        &mut self,
        left: PlayerId,
        right: PlayerId,
        winner: PlayerId,
    ) -> Result<(), StoreError> {
        self.store
            .record_vote(Vote { left, right, winner })
            .await?;
        self.refresh().await
    }

    /// Switch the active pool filter. Clears cooldown (stale pairs may no
    /// longer be reachable under the new pool) and re-reads the store.
    pub async fn set_team_filter(&mut self, team: Option<String>) -> Result<(), StoreError> {
        self.team_filter = team;
        self.sampler.reset_cooldown();
        self.refresh().await
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn scores(&self) -> &HashMap<PlayerId, f64> {
        &self.scores
    }

    pub fn exposure(&self) -> &HashMap<PlayerId, u64> {
        &self.exposure
    }

    pub fn team_filter(&self) -> Option<&str> {
        self.team_filter.as_deref()
    }
}
