use anyhow::{Context, Result, bail};
use log::LevelFilter;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use crate::shell::DEFAULT_PROMPT;
use crate::shell::context::DEFAULT_NULL_DEVICE;

pub const CONFIG_FILE: &str = "smallsh.toml";

#[derive(Debug, Deserialize, Default)]
pub struct SmallshConfig {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Env files that were merged into `env`, in load order.
    #[serde(skip)]
    pub env_sources: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub max_jobs: Option<usize>,
    pub null_device: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_jobs: None,
            null_device: PathBuf::from(DEFAULT_NULL_DEVICE),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            color: true,
        }
    }
}

pub fn parse_config(content: &str) -> Result<SmallshConfig> {
    let config: SmallshConfig = toml::from_str(content)?;
    if config.shell.max_jobs == Some(0) {
        bail!("Configuration Error: 'shell.max_jobs' must be at least 1");
    }
    Ok(config)
}

/// Loads `explicit` (which must exist) or `<dir>/smallsh.toml` (optional),
/// then layers the env file from `dir` on top of the `[env]` table.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<SmallshConfig> {
    let config_path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Critical: config file {:?} not found.", path);
            }
            path.to_path_buf()
        }
        None => dir.join(CONFIG_FILE),
    };

    // 1. Parse smallsh.toml (Base Layer)
    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        parse_config(&content).with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else {
        SmallshConfig::default()
    };

    // 2. Load .env using dotenvy (Override Layer)
    // Determines filename: .env or .env.<name> based on SMALLSH_ENV
    let env_filename = env::var("SMALLSH_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());
    apply_env_file(&mut config, &dir.join(env_filename))?;

    Ok(config)
}

/// Merges an env file into `config.env` without touching the process environment.
pub fn apply_env_file(config: &mut SmallshConfig, env_path: &Path) -> Result<()> {
    if !env_path.exists() {
        return Ok(());
    }
    let entries = dotenvy::from_path_iter(env_path)
        .with_context(|| format!("Failed to read {}", env_path.display()))?;
    for item in entries {
        let (key, val) = item.with_context(|| format!("Failed to parse {}", env_path.display()))?;
        // env file overrides smallsh.toml
        config.env.insert(key, val);
    }
    config.env_sources.push(env_path.to_path_buf());
    Ok(())
}
