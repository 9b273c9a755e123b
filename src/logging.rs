//! File logging. The terminal belongs to the UI, so events go to
//! `$XDG_DATA_HOME/marquee/marquee.log` instead of stderr.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Env var that overrides the configured log level, in `EnvFilter` syntax
pub const LOG_ENV: &str = "MARQUEE_LOG";

const LOG_FILE: &str = "marquee.log";

/// Directory the log file is written to
pub fn log_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .map(|dir| dir.join("marquee"))
    .ok_or_else(|| eyre!("Could not determine data directory"))
}

/// Install the global subscriber.
///
/// The returned guard flushes buffered events when dropped, so keep it alive
/// until the app exits.
pub fn init(default_level: &str) -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .wrap_err_with(|| format!("Failed to create log directory {}", dir.display()))?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let env_filter = filter(std::env::var(LOG_ENV).ok().as_deref(), default_level);

  tracing_subscriber::registry()
    .with(env_filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false),
    )
    .try_init()
    .wrap_err("Failed to install tracing subscriber")?;

  Ok(guard)
}

/// Env override first, then the configured level, then `info`.
fn filter(env: Option<&str>, default_level: &str) -> EnvFilter {
  env
    .and_then(|directives| EnvFilter::try_new(directives).ok())
    .or_else(|| EnvFilter::try_new(default_level).ok())
    .unwrap_or_else(|| EnvFilter::new("info"))
}
