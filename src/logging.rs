//! Tracing setup.
//!
//! Log lines always reach stdout. When a log file is configured the same
//! lines are teed into it with ANSI escapes stripped; without one the
//! gateway logs to the console alone. `RUST_LOG` overrides the configured
//! level for targeted debugging.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Resolve the configured level, falling back to `info` on junk input.
fn level_or_default(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::INFO)
}

/// Open a log file for writing, creating missing parent directories.
fn open_log_file(path: &str) -> Result<File> {
    if let Some(dir) = Path::new(path).parent() {
        fs::create_dir_all(dir)?;
    }
    Ok(File::create(path)?)
}

/// Install the global tracing subscriber.
///
/// Fails only when the configured log file cannot be opened; the caller may
/// retry with `file` unset to keep console output alive.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_or_default(&config.level).into())
        .from_env_lossy();

    let console = tracing_subscriber::fmt::layer().with_target(true);

    match config.file.as_deref() {
        Some(path) => {
            let log_file = Arc::new(open_log_file(path)?);
            tracing_subscriber::registry()
                .with(
                    console
                        .with_writer(std::io::stdout.and(log_file))
                        .with_ansi(false),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(console)
                .with(filter)
                .init();
        }
    }

    Ok(())
}
