//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for skipvote
#[derive(Parser, Debug)]
#[command(name = "skipvote")]
#[command(author, version, about = "Quorum-based night/storm skip voting")]
#[command(long_about = r#"
Skipvote coordinates vote-to-skip rounds across simulated game worlds:
players cast votes, and once a configurable quorum of eligible players is
reached, the world's night or storm is skipped after a short countdown.

Without flags it opens an interactive console against a simulated world;
--demo runs a scripted round instead.

Configuration files are loaded from (in priority order):
1. SKIPVOTE_* environment variables
2. --config <path>     Explicit config file
3. ./skipvote.toml     Project-level config
4. ~/.config/skipvote/config.toml   Global config

Example:
  skipvote --players 8
  skipvote --demo --host-model parallel-region
  skipvote --config server.toml --history skips.jsonl -vv
"#)]
pub struct Cli {
    /// Run the scripted demo round instead of the interactive console
    #[arg(long)]
    pub demo: bool,

    /// World to simulate
    #[arg(short, long, default_value = "overworld", value_name = "NAME")]
    pub world: String,

    /// Number of simulated players present at start
    #[arg(short, long, default_value_t = 5, value_name = "COUNT")]
    pub players: u32,

    /// Host threading model (single-loop, cooperative-legacy, parallel-region)
    #[arg(long, value_name = "MODEL")]
    pub host_model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress console feedback
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Append completed skips to this JSONL history file
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
