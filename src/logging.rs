use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sends tracing output to a daily log file under `log_dir`. The terminal
/// belongs to the UI, so nothing is written to stdout or stderr.
///
/// The returned guard flushes the writer on drop and must outlive the app.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, "taskboard.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(dir = %log_dir.display(), "logging initialized");
    Ok(guard)
}
