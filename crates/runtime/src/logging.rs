use std::{
    io::{self, Write},
    sync::OnceLock,
    thread,
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::PROGRAM_LOG_LEVEL;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Writes one line per record to stderr, leaving stdout to the data.
///
/// Lines carry the emitting thread so reader and batch consumer output can be
/// told apart, e.g.
/// `2026-10-17 09:12:01.337 INFO  linekv-batcher pipeline::driver: Inserted 1000 lines`.
pub struct StderrLogger {
    filter: LevelFilter,
}

impl StderrLogger {
    pub fn new(filter: LevelFilter) -> Self {
        Self { filter }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let line = format_line(&timestamp, thread::current().name(), record);

        // A closed stderr must not take the run down with it.
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Render `record` without the trailing newline.
pub(crate) fn format_line(timestamp: &str, thread: Option<&str>, record: &Record<'_>) -> String {
    format!(
        "{timestamp} {:<5} {} {}: {}",
        record.level(),
        thread.unwrap_or("-"),
        short_target(record.target()),
        record.args()
    )
}

/// Module paths of our own crates lose their `linekv_` prefix.
fn short_target(target: &str) -> &str {
    target.strip_prefix("linekv_").unwrap_or(target)
}

/// Level filter for a `LINEKV_LOG_LEVEL` value. Unset or unknown values fall
/// back to `default`; `off` silences everything, progress included.
pub(crate) fn resolve_filter(raw: Option<&str>, default: Level) -> LevelFilter {
    raw.and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .unwrap_or_else(|| default.to_level_filter())
}

/// Install the stderr logger, reading the level from `LINEKV_LOG_LEVEL`.
///
/// The binaries pass `Level::Info`: per-batch progress is logged at info and
/// is the tool's main output. Only the first call has any effect.
pub fn init(default: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

    if LOGGER.get().is_some() {
        return Ok(());
    }

    let raw = std::env::var(PROGRAM_LOG_LEVEL).ok();
    let filter = resolve_filter(raw.as_deref(), default);
    let logger = LOGGER.get_or_init(|| StderrLogger::new(filter));

    log::set_logger(logger)?;
    log::set_max_level(filter);
    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
