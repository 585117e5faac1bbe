use crate::config::LogLevel;
use log::LevelFilter;

/// `-v` raises the configured level one step per flag.
pub fn level_for(configured: LogLevel, verbose: u8) -> LevelFilter {
    let base = LevelFilter::from(configured);
    match verbose {
        0 => base,
        1 => base.max(LevelFilter::Info),
        2 => base.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    }
}

/// Logs go to stderr only; stdout carries the prompt and job reports.
/// `RUST_LOG`, when set, wins over `level`.
pub fn init(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .parse_default_env();
    let _ = builder.try_init();
}
