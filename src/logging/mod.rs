// Logging setup - every progress line goes to the console and to a daily log file
// Files rotate daily and only the last two weeks are kept

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How many daily log files to keep around
pub const KEEP_LOG_FILES: usize = 14;

/// `[HH:MM:SS]` local time, what the operator sees on screen
struct ConsoleClock;

impl FormatTime for ConsoleClock {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", Local::now().format("%H:%M:%S"))
    }
}

/// `[YYYY-MM-DD HH:MM:SS]` local time for the log file
struct FileClock;

impl FormatTime for FileClock {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the global subscriber. Hold on to the guard until exit or the tail of the log is lost.
pub fn init_logging(log_dir: &Path, debug: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Daily rotating file appender, oldest files pruned
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("playlift")
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(log_dir)
        .context("Failed to open log file")?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if debug { "debug" } else { "info,playlift=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(ConsoleClock)
        .with_target(false)
        .with_level(debug)
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(FileClock)
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(debug)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logging already initialised")?;

    tracing::debug!("Logging to {}", log_dir.display());
    Ok(guard)
}

/// "1 track", "2 tracks", "1,234 tracks"
pub fn pluralise(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", group_thousands(count), plural)
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralise() {
        assert_eq!(pluralise(0, "track", "tracks"), "0 tracks");
        assert_eq!(pluralise(1, "track", "tracks"), "1 track");
        assert_eq!(pluralise(999, "playlist", "playlists"), "999 playlists");
        assert_eq!(pluralise(1_234, "track", "tracks"), "1,234 tracks");
        assert_eq!(pluralise(12_345_678, "track", "tracks"), "12,345,678 tracks");
    }
}
