use std::path::PathBuf;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "carebridge.log";
const DEFAULT_FILTER: &str = "carebridge=info,carebridge_core=info";

/// The terminal belongs to the UI, so logs go to a file in the data dir
pub fn log_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("Could not find data directory")?
        .join("carebridge");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::never(log_dir()?, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}
