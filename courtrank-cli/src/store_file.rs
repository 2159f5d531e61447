/// JSON-file-backed store adapter.
///
/// Holds the same state as `MemoryStore` and rewrites one JSON file after
/// every confirmed vote, so counts survive across runs. The whole
/// read-modify-write-persist sequence happens under one lock — a vote is
/// only acknowledged once it is on disk.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use courtrank_core::{
    validate_vote, AggregateStore, PairAggregate, PairKey, Player, PlayerId, StoreError, Vote,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One line of the append-only vote log.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVote {
    left: PlayerId,
    right: PlayerId,
    winner: PlayerId,
    ts: i64,
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    aggregates: Vec<PairAggregate>,
    #[serde(default)]
    votes: Vec<StoredVote>,
}

struct FileInner {
    aggregates: HashMap<PairKey, PairAggregate>,
    votes: Vec<StoredVote>,
}

pub struct JsonFileStore {
    path: PathBuf,
    players: Vec<Player>,
    inner: Mutex<FileInner>,
}

impl JsonFileStore {
    /// Open (or create) the store file for the given roster. Previously
    /// accumulated counts for players no longer on the roster stay in the
    /// file untouched; they are simply filtered out by pool computation.
    pub fn open(path: &Path, players: Vec<Player>) -> Result<Self, StoreError> {
        let file = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<StoreFile>(&content).map_err(|e| {
                StoreError::Read {
                    reason: format!("corrupt store file {}: {e}", path.display()),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => {
                return Err(StoreError::Read {
                    reason: format!("failed to read {}: {e}", path.display()),
                })
            }
        };

        let aggregates = file.aggregates.into_iter().map(|a| (a.key, a)).collect();
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            players,
            inner: Mutex::new(FileInner {
                aggregates,
                votes: file.votes,
            }),
        })
    }

    fn persist(&self, inner: &FileInner) -> Result<(), StoreError> {
        let mut aggregates: Vec<PairAggregate> = inner.aggregates.values().copied().collect();
        aggregates.sort_by_key(|a| a.key);
        let file = StoreFile {
            aggregates,
            votes: inner.votes.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Write {
            reason: format!("serialize store: {e}"),
        })?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::Write {
            reason: format!("failed to write {}: {e}", self.path.display()),
        })
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl AggregateStore for JsonFileStore {
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
        let inner = self.inner.lock().await;
        let mut rows: Vec<PairAggregate> = inner.aggregates.values().copied().collect();
        rows.sort_by_key(|a| a.key);
        Ok(rows)
    }

    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let key = validate_vote(&vote, |id| self.players.iter().any(|p| p.id == id))?;

        let mut inner = self.inner.lock().await;
        // Apply to a copy first: a failed disk write must leave the
        // in-memory counts exactly as they were.
        let mut updated = inner
            .aggregates
            .get(&key)
            .copied()
            .unwrap_or_else(|| PairAggregate::new(key));
        updated.record_win(vote.winner);

        let stored = StoredVote {
            left: vote.left,
            right: vote.right,
            winner: vote.winner,
            ts: Self::now_secs(),
        };

        let previous = inner.aggregates.insert(key, updated);
        inner.votes.push(stored);
        match self.persist(&inner) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Roll back so memory matches disk.
                inner.votes.pop();
                match previous {
                    Some(prev) => {
                        inner.aggregates.insert(key, prev);
                    }
                    None => {
                        inner.aggregates.remove(&key);
                    }
                }
                Err(e)
            }
        }
    }
}
