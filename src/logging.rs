use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file used while the terminal UI owns the screen
pub const LOG_FILE_NAME: &str = "finance-tracker.log";

fn env_filter(level: &str) -> EnvFilter {
    // RUST_LOG wins over the command line level.
    let default_filter = format!("finance_tracker={level}");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Log to stderr. Used by the one-shot commands so stdout stays clean for
/// tables and JSON.
pub fn init_stderr_logging(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Append logs to `{dir}/finance-tracker.log`. Anything written to the
/// terminal would corrupt the UI's alternate screen.
pub fn init_file_logging(dir: &Path, level: &str) -> anyhow::Result<()> {
    let log_path = dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!("Logging initialized (log_path={})", log_path.display());
    Ok(())
}
