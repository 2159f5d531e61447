mod config;
mod output;
mod roster;
mod store_file;

use clap::Parser;
use courtrank_core::{
    AggregateStore, MemoryStore, Player, RankingSession, RatingConfig, SampleError, SamplerConfig,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::store_file::JsonFileStore;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "courtrank", version, about = "Rank players from head-to-head votes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run an interactive voting session
    Duel(SessionArgs),
    /// Print the current standings without voting
    Standings(SessionArgs),
    /// Create a default config file at ~/.config/courtrank/config.toml
    Init,
}

#[derive(Parser)]
struct SessionArgs {
    /// Roster file: JSON array or one player per line ("Name | Team")
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Persist vote counts to this JSON file (in-memory only if omitted)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Restrict matchups to one team
    #[arg(long)]
    team: Option<String>,

    /// Output standings as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show refresh/recompute activity
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/courtrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Smoothing pseudocount for the rating fit
    #[arg(long)]
    prior: Option<f64>,

    /// Probability of drawing the first player from the least-compared
    /// quarter of the pool
    #[arg(long)]
    explore: Option<f64>,

    /// How many recent matchups to avoid repeating
    #[arg(long)]
    cooldown: Option<usize>,
}

/// Everything a session run needs, after merging config file and CLI args
/// (CLI wins).
struct Resolved {
    players: Vec<Player>,
    store_path: Option<PathBuf>,
    team: Option<String>,
    rating: RatingConfig,
    sampler: SamplerConfig,
}

fn resolve(args: &SessionArgs) -> Resolved {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let roster_path = args
        .roster
        .clone()
        .or(cfg.roster.map(PathBuf::from))
        .unwrap_or_else(|| {
            bail(format!(
                "No roster specified. Pass --roster or set it in {}",
                config_path.display(),
            ));
        });
    let players = roster::load_roster(&roster_path);

    let prior = args.prior.or(cfg.prior).unwrap_or(courtrank_core::constants::DEFAULT_PRIOR);
    if prior < 0.0 {
        bail("--prior must be non-negative");
    }
    let explore = args
        .explore
        .or(cfg.explore_probability)
        .unwrap_or(courtrank_core::constants::DEFAULT_EXPLORE_PROBABILITY);
    if !(0.0..=1.0).contains(&explore) {
        bail("--explore must be between 0.0 and 1.0");
    }

    let rating = RatingConfig {
        prior,
        ..RatingConfig::default()
    };
    let sampler = SamplerConfig {
        explore_probability: explore,
        cooldown_capacity: args
            .cooldown
            .or(cfg.cooldown_capacity)
            .unwrap_or(courtrank_core::constants::DEFAULT_COOLDOWN_CAPACITY),
        ..SamplerConfig::default()
    };

    Resolved {
        players,
        store_path: args.store.clone().or(cfg.store.map(PathBuf::from)),
        team: args.team.clone().or(cfg.team),
        rating,
        sampler,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Duel(args) => {
            init_logging(args.verbose);
            let resolved = resolve(&args);
            match resolved.store_path.clone() {
                Some(path) => {
                    let store = JsonFileStore::open(&path, resolved.players.clone())
                        .unwrap_or_else(|e| bail(e));
                    run_duel(Arc::new(store), resolved, args.json).await;
                }
                None => {
                    let store = MemoryStore::new(resolved.players.clone());
                    run_duel(Arc::new(store), resolved, args.json).await;
                }
            }
        }
        Commands::Standings(args) => {
            init_logging(args.verbose);
            let resolved = resolve(&args);
            match resolved.store_path.clone() {
                Some(path) => {
                    let store = JsonFileStore::open(&path, resolved.players.clone())
                        .unwrap_or_else(|e| bail(e));
                    print_standings(Arc::new(store), resolved, args.json).await;
                }
                None => {
                    let store = MemoryStore::new(resolved.players.clone());
                    print_standings(Arc::new(store), resolved, args.json).await;
                }
            }
        }
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default roster, store file, etc.");
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn matchup_label(player: &Player) -> String {
    match &player.team {
        Some(team) => format!("{} ({})", player.name, team),
        None => player.name.clone(),
    }
}

async fn run_duel<S: AggregateStore>(store: Arc<S>, resolved: Resolved, json: bool) {
    let mut session = RankingSession::new(store, resolved.team, resolved.rating, resolved.sampler);
    if let Err(e) = session.refresh().await {
        bail(e);
    }

    println!("Vote 1 or 2 for the better player, s to skip, q to quit.\n");

    let stdin = io::stdin();
    loop {
        let (a, b) = match session.next_pair() {
            Ok(pair) => pair,
            Err(SampleError::PoolTooSmall { size }) => {
                eprintln!(
                    "Not enough players to compare ({size}). Add players or drop the team filter.",
                );
                break;
            }
        };

        println!("[1] {}   vs   [2] {}", matchup_label(&a), matchup_label(&b));
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => bail(format!("Failed to read from stdin: {e}")),
        }

        let winner = match line.trim() {
            "1" => a.id,
            "2" => b.id,
            "s" | "" => continue,
            "q" => break,
            other => {
                println!("Unrecognized input \"{other}\" — use 1, 2, s, or q.");
                continue;
            }
        };

        // A failed write means the vote was not counted; the session view
        // is untouched and the next matchup is drawn from the old state.
        if let Err(e) = session.record_vote(a.id, b.id, winner).await {
            eprintln!("Vote not counted: {e}");
        }
    }

    println!();
    if json {
        output::print_json(session.players(), session.scores(), session.exposure());
    } else {
        output::print_table(session.players(), session.scores(), session.exposure());
    }
}

async fn print_standings<S: AggregateStore>(store: Arc<S>, resolved: Resolved, json: bool) {
    let mut session = RankingSession::new(store, resolved.team, resolved.rating, resolved.sampler);
    if let Err(e) = session.refresh().await {
        bail(e);
    }

    if json {
        output::print_json(session.players(), session.scores(), session.exposure());
    } else {
        output::print_table(session.players(), session.scores(), session.exposure());
    }
}
