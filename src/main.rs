mod cli;
mod config;
mod handlers;
mod logger;
mod shell;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use handlers::shell::handle_interactive;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let code = handle_interactive(&cli)?;
    std::process::exit(code);
}
