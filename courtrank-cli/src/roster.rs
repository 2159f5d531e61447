/// Roster parsing: turn a player file into `Player` records.
///
/// Two formats are auto-detected:
///   - JSON array: `[{"name": "Ava", "team": "Hawks"}, ...]` (team optional,
///     bare strings also accepted)
///   - plain text: one player per line, `Name` or `Name | Team`
///
/// IDs are assigned by position. The ranking core never sees names beyond
/// carrying them around for display.
use courtrank_core::Player;
use serde::Deserialize;
use std::path::Path;

use crate::bail;

#[derive(Deserialize)]
#[serde(untagged)]
enum PlayerSpec {
    Bare(String),
    Full {
        name: String,
        #[serde(default)]
        team: Option<String>,
    },
}

/// Parse roster content: JSON array if it starts with '[', otherwise one
/// player per line with an optional `| Team` suffix.
pub fn parse_roster(content: &str) -> Vec<Player> {
    let trimmed = content.trim();
    let specs: Vec<(String, Option<String>)> = if trimmed.starts_with('[') {
        let specs: Vec<PlayerSpec> = serde_json::from_str(trimmed)
            .unwrap_or_else(|e| bail(format!("Roster looks like JSON but failed to parse: {e}")));
        specs
            .into_iter()
            .map(|spec| match spec {
                PlayerSpec::Bare(name) => (name, None),
                PlayerSpec::Full { name, team } => (name, team),
            })
            .collect()
    } else {
        trimmed
            .lines()
            .map(|line| match line.split_once('|') {
                Some((name, team)) => {
                    let team = team.trim();
                    (
                        name.trim().to_string(),
                        (!team.is_empty()).then(|| team.to_string()),
                    )
                }
                None => (line.trim().to_string(), None),
            })
            .collect()
    };

    specs
        .into_iter()
        .filter(|(name, _)| !name.is_empty())
        .enumerate()
        .map(|(idx, (name, team))| Player {
            id: idx as i64,
            name,
            team,
        })
        .collect()
}

/// Load and parse the roster file, bailing on anything unusable.
pub fn load_roster(path: &Path) -> Vec<Player> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read roster file {}: {e}", path.display())));
    let players = parse_roster(&content);
    if players.len() < 2 {
        bail(format!(
            "Need at least 2 players to compare, got {} in {}",
            players.len(),
            path.display(),
        ));
    }
    players
}
