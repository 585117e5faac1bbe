use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smallsh", version, about = "smallsh: a small shell with background jobs")]
pub struct Cli {
    /// Read settings from this TOML file instead of ./smallsh.toml
    #[arg(short, long, env = "SMALLSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prompt printed before each command line
    #[arg(long)]
    pub prompt: Option<String>,

    /// Refuse to start more than this many background jobs at once
    #[arg(long)]
    pub max_jobs: Option<usize>,

    /// Disable colored diagnostics
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
