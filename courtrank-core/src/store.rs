/// The narrow store boundary.
///
/// The core never owns durable state: it reads snapshots through this trait
/// and writes votes through it. The store is the single serialization point
/// for aggregate increments — everything above it is pure recomputation.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::types::{PairAggregate, PairKey, Player, PlayerId, Snapshot, Vote};

#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Eligible players, optionally restricted to one team.
    async fn list_players(&self, team: Option<&str>) -> Result<Vec<Player>, StoreError>;

    /// Every pair aggregate row. Callers restrict to their pool themselves.
    async fn list_pair_aggregates(&self) -> Result<Vec<PairAggregate>, StoreError>;

    /// Atomically apply one vote to the canonical pair row, creating the row
    /// on first contact. Concurrent votes on the same pair must both land.
    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError>;

    /// One consistent read of players + aggregates.
    async fn snapshot(&self, team: Option<&str>) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            players: self.list_players(team).await?,
            aggregates: self.list_pair_aggregates().await?,
        })
    }
}

/// Validate a vote against the roster before touching any row. Returns the
/// canonical key for the displayed pair. Store implementations call this
/// before their atomic increment.
pub fn validate_vote(
    vote: &Vote,
    known: impl Fn(PlayerId) -> bool,
) -> Result<PairKey, StoreError> {
    for id in [vote.left, vote.right] {
        if !known(id) {
            return Err(StoreError::UnknownPlayer { id });
        }
    }
    let key = PairKey::new(vote.left, vote.right).ok_or(StoreError::InvalidVote {
        left: vote.left,
        right: vote.right,
        winner: vote.winner,
    })?;
    if !key.contains(vote.winner) {
        return Err(StoreError::InvalidVote {
            left: vote.left,
            right: vote.right,
            winner: vote.winner,
        });
    }
    Ok(key)
}

struct MemoryInner {
    aggregates: HashMap<PairKey, PairAggregate>,
    /// Append-only vote log. Not consumed by the read path; kept so
    /// aggregates can be rebuilt or audited.
    votes: Vec<Vote>,
}

/// In-memory store. The write lock makes each vote's read-modify-write
/// atomic; all state is lost on drop.
pub struct MemoryStore {
    players: Vec<Player>,
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new(players: Vec<Player>) -> Self {
        Self::with_aggregates(players, Vec::new())
    }

    /// Start from previously accumulated rows (e.g. loaded by a persistence
    /// adapter).
    pub fn with_aggregates(players: Vec<Player>, aggregates: Vec<PairAggregate>) -> Self {
        let aggregates = aggregates.into_iter().map(|a| (a.key, a)).collect();
        MemoryStore {
            players,
            inner: RwLock::new(MemoryInner {
                aggregates,
                votes: Vec::new(),
            }),
        }
    }

    /// Votes recorded since this store was created.
    pub async fn vote_log(&self) -> Vec<Vote> {
        self.inner.read().await.votes.clone()
    }
}

#[async_trait]
impl AggregateStore for MemoryStore {
    async fn list_players(&self, team: Option<&str>) -> Result<Vec<Player>, StoreError> {
        let players = match team {
            Some(team) => self
                .players
                .iter()
                .filter(|p| p.team.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(team)))
                .cloned()
                .collect(),
            None => self.players.clone(),
        };
        Ok(players)
    }

    async fn list_pair_aggregates(&self) -> Result<Vec<PairAggregate>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<PairAggregate> = inner.aggregates.values().copied().collect();
        rows.sort_by_key(|a| a.key);
        Ok(rows)
    }

    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let key = validate_vote(&vote, |id| self.players.iter().any(|p| p.id == id))?;

        // Single write lock covers the whole read-modify-write.
        let mut inner = self.inner.write().await;
        inner
            .aggregates
            .entry(key)
            .or_insert_with(|| PairAggregate::new(key))
            .record_win(vote.winner);
        inner.votes.push(vote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn player(id: PlayerId, name: &str, team: Option<&str>) -> Player {
        Player {
            id,
            name: name.to_string(),
            team: team.map(str::to_string),
        }
    }

    fn roster() -> Vec<Player> {
        vec![
            player(1, "Ava", Some("Hawks")),
            player(2, "Bo", Some("Hawks")),
            player(3, "Cy", Some("Comets")),
        ]
    }

    #[tokio::test]
    async fn test_vote_creates_row_lazily() {
        let store = MemoryStore::new(roster());
        assert!(store.list_pair_aggregates().await.unwrap().is_empty());

        store.record_vote(Vote { left: 2, right: 1, winner: 2 }).await.unwrap();

        let rows = store.list_pair_aggregates().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, PairKey::new(1, 2).unwrap());
        assert_eq!(rows[0].wins_for(2), Some(1));
        assert_eq!(rows[0].total, 1);
    }

    #[tokio::test]
    async fn test_both_orientations_hit_same_row() {
        let store = MemoryStore::new(roster());
        store.record_vote(Vote { left: 1, right: 2, winner: 1 }).await.unwrap();
        store.record_vote(Vote { left: 2, right: 1, winner: 1 }).await.unwrap();

        let rows = store.list_pair_aggregates().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].wins_for(1), Some(2));
        assert_eq!(rows[0].total, 2);
    }

    #[tokio::test]
    async fn test_rejects_bad_votes() {
        let store = MemoryStore::new(roster());

        let err = store.record_vote(Vote { left: 1, right: 99, winner: 1 }).await;
        assert!(matches!(err, Err(StoreError::UnknownPlayer { id: 99 })));

        let err = store.record_vote(Vote { left: 1, right: 2, winner: 3 }).await;
        assert!(matches!(err, Err(StoreError::InvalidVote { .. })));

        let err = store.record_vote(Vote { left: 1, right: 1, winner: 1 }).await;
        assert!(matches!(err, Err(StoreError::InvalidVote { .. })));

        assert!(store.list_pair_aggregates().await.unwrap().is_empty());
        assert!(store.vote_log().await.is_empty());
    }

    #[tokio::test]
    async fn test_team_filter() {
        let store = MemoryStore::new(roster());
        let hawks = store.list_players(Some("hawks")).await.unwrap();
        assert_eq!(hawks.len(), 2);
        let all = store.list_players(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_on_same_pair_both_land() {
        let store = Arc::new(MemoryStore::new(roster()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let winner = if i % 2 == 0 { 1 } else { 2 };
                store.record_vote(Vote { left: 1, right: 2, winner }).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let rows = store.list_pair_aggregates().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, 20, "every concurrent vote must land");
        assert_eq!(rows[0].wins_lo, 10);
        assert_eq!(rows[0].wins_hi, 10);
    }
}
