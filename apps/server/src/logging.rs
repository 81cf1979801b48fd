//! Logging initialization
//!
//! Console output is always on (pretty or JSON); a rolling file sink is added
//! when `logging.file_enabled` is set. The returned guard flushes the file
//! writer on drop and must be kept alive for the life of the process.

use crate::config::LoggingConfig;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[must_use]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    // RUST_LOG wins over the configured level when present.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {e}", config.level))?;

    let console = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, file_guard) = if config.file_enabled {
        let appender = match config.file_rotation.to_ascii_lowercase().as_str() {
            "minutely" => rolling::minutely(&config.file_directory, &config.file_prefix),
            "hourly" => rolling::hourly(&config.file_directory, &config.file_prefix),
            "never" => rolling::never(&config.file_directory, &config.file_prefix),
            "daily" => rolling::daily(&config.file_directory, &config.file_prefix),
            other => anyhow::bail!("Unknown logging.file_rotation '{other}'"),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
