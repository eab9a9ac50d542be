//! File-based logging using simplelog.
//!
//! The TUI owns stdout, so logs only ever go to `debug.log`.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const LOG_FILE: &str = "debug.log";

/// Level from `RUST_LOG`, defaulting to debug.
pub fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Debug,
    }
}

/// Install a `WriteLogger` appending to `debug.log` in `dir`.
pub fn init(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(LOG_FILE);
    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c)
        .build();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;
    Ok(path)
}
