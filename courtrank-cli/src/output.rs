/// Output formatting: terminal table and JSON.
use std::collections::HashMap;

use courtrank_core::{ranked, Player, PlayerId};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedPlayer {
    rank: usize,
    name: String,
    team: Option<String>,
    score: f64,
    comparisons: u64,
}

#[derive(Serialize)]
struct JsonOutput {
    players: Vec<JsonRankedPlayer>,
    total_comparisons: u64,
}

fn rows(
    players: &[Player],
    scores: &HashMap<PlayerId, f64>,
    exposure: &HashMap<PlayerId, u64>,
) -> Vec<(Player, f64, u64)> {
    ranked(scores)
        .into_iter()
        .filter_map(|(id, score)| {
            players.iter().find(|p| p.id == id).map(|player| {
                (player.clone(), score, exposure.get(&id).copied().unwrap_or(0))
            })
        })
        .collect()
}

/// Print standings as a formatted terminal table, best first.
pub fn print_table(
    players: &[Player],
    scores: &HashMap<PlayerId, f64>,
    exposure: &HashMap<PlayerId, u64>,
) {
    let rows = rows(players, scores, exposure);

    let name_width = rows
        .iter()
        .map(|(p, _, _)| p.name.len())
        .max()
        .unwrap_or(6)
        .max(6); // at least "Player"
    let team_width = rows
        .iter()
        .map(|(p, _, _)| p.team.as_deref().unwrap_or("-").len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        " # | {:<name_width$} | {:<team_width$} |  Score | Comparisons",
        "Player", "Team",
    );
    println!(
        "---|-{}-|-{}-|--------|------------",
        "-".repeat(name_width),
        "-".repeat(team_width),
    );

    for (i, (player, score, comparisons)) in rows.iter().enumerate() {
        println!(
            "{:>2} | {:<name_width$} | {:<team_width$} | {:>6.4} | {:>11}",
            i + 1,
            player.name,
            player.team.as_deref().unwrap_or("-"),
            score,
            comparisons,
        );
    }

    // Each comparison touches two players.
    let total: u64 = rows.iter().map(|(_, _, c)| c).sum::<u64>() / 2;
    println!("\n{} players ranked ({} comparisons)", rows.len(), total);
}

/// Print standings as JSON.
pub fn print_json(
    players: &[Player],
    scores: &HashMap<PlayerId, f64>,
    exposure: &HashMap<PlayerId, u64>,
) {
    let rows = rows(players, scores, exposure);
    let total: u64 = rows.iter().map(|(_, _, c)| c).sum::<u64>() / 2;

    let output = JsonOutput {
        players: rows
            .into_iter()
            .enumerate()
            .map(|(i, (player, score, comparisons))| JsonRankedPlayer {
                rank: i + 1,
                name: player.name,
                team: player.team,
                score,
                comparisons,
            })
            .collect(),
        total_comparisons: total,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}
