//! Logger construction from [`LoggerConfig`].

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use fsaudit_config::{LogFormat, LogRotation, LoggerConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: an optional stdout layer and an optional
/// non-blocking file layer, both filtered by the configured level (`RUST_LOG`
/// takes precedence when set).
///
/// The returned guard must be held until process exit so buffered file
/// records are flushed.
pub fn init(config: &LoggerConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.stdout {
        layers.push(match config.format {
            LogFormat::Json => fmt::layer().json().boxed(),
            LogFormat::Text => fmt::layer().compact().boxed(),
        });
    }

    if !config.file.is_empty() {
        let path = Path::new(&config.file);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .with_context(|| format!("log file path has no file name: {}", config.file))?;

        let appender = match config.rotation {
            LogRotation::Never => tracing_appender::rolling::never(dir, name),
            LogRotation::Daily => tracing_appender::rolling::daily(dir, name),
            LogRotation::Hourly => tracing_appender::rolling::hourly(dir, name),
        };
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);

        layers.push(match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
            LogFormat::Text => fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();

    Ok(guard)
}
