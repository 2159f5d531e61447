/// Config file loading and creation for the courtrank CLI.
///
/// Config lives at ~/.config/courtrank/config.toml.
/// All fields are optional — CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default)]
pub struct CourtrankConfig {
    pub roster: Option<String>,
    pub store: Option<String>,
    pub team: Option<String>,
    pub prior: Option<f64>,
    pub explore_probability: Option<f64>,
    pub cooldown_capacity: Option<usize>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# courtrank configuration
# All values here can be overridden by CLI flags.

# Default roster file (JSON array or one player per line)
# roster = \"players.json\"

# Where accumulated vote counts are kept between runs
# store = \"courtrank-store.json\"

# Restrict matchups to one team by default
# team = \"Hawks\"

# Smoothing pseudocount for the rating fit
# prior = 0.5

# Probability the first player of a matchup is drawn from the
# least-compared quarter of the pool
# explore_probability = 0.7

# How many recent matchups to avoid repeating
# cooldown_capacity = 50
";

/// Returns the default config path: ~/.config/courtrank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("courtrank").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> CourtrankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            toml::from_str(&content)
                .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CourtrankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config() -> PathBuf {
    let path = config_path();

    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path
}
