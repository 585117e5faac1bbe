use anyhow::{Context, Result, bail};
use colored::*;
use log::info;
use std::env;
use std::io;
use crate::cli::Cli;
use crate::config::load_config;
use crate::logger;
use crate::shell::Shell;
use crate::shell::context::ShellContext;
use crate::shell::signals;

/// Starts an interactive session on the process's stdin/stdout and returns
/// the code the process should exit with.
pub fn handle_interactive(cli: &Cli) -> Result<i32> {
    let current_dir = env::current_dir().context("Failed to read current directory")?;
    // Config includes merged envs from smallsh.toml and .env
    let config = load_config(cli.config.as_deref(), &current_dir)?;

    logger::init(logger::level_for(config.log.level, cli.verbose));
    if cli.no_color || !config.log.color {
        colored::control::set_override(false);
    }
    for source in &config.env_sources {
        info!("{} Loaded environment from: {}", "🌿".green(), source.display());
    }

    let max_jobs = cli.max_jobs.or(config.shell.max_jobs);
    if max_jobs == Some(0) {
        bail!("--max-jobs must be at least 1");
    }

    let mut ctx = ShellContext::new()
        .with_env_overrides(&config.env)
        .with_job_limit(max_jobs)
        .with_null_device(&config.shell.null_device);

    signals::ignore_interrupt()?;
    ctx.mode.install_toggle_handler()?;

    let prompt = cli.prompt.clone().unwrap_or(config.shell.prompt);
    info!("session started in {} (job limit: {:?})", ctx.cwd.display(), max_jobs);

    let stdin = io::stdin();
    let mut shell = Shell::new(ctx, stdin.lock(), io::stdout()).with_prompt(prompt);
    shell.run()
}
