mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use fsaudit_config::AppConfig;
use fsaudit_pipeline::{TracingSink, run_pipeline};
use fsaudit_watcher::RecursiveWatcher;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Parser)]
#[command(
    name = "fsaudit",
    version,
    about = "Recursive filesystem change auditor"
)]
struct Cli {
    /// Path to the configuration TOML file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Watch this directory, overriding the configured path.
    #[arg(long)]
    watch: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the full version (package version plus build tag).
    Version,
    /// Write the default configuration file and exit.
    Configfile {
        /// Destination path for the generated TOML.
        #[arg(default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
    },
}

/// `<package version>+<build tag>`, `-` when no tag was injected at build time.
fn semver() -> String {
    format!(
        "{}+{}",
        env!("CARGO_PKG_VERSION"),
        option_env!("FSAUDIT_BUILD").unwrap_or("-")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("{}", semver());
            return Ok(());
        }
        Some(Commands::Configfile { path }) => {
            AppConfig::default()
                .save_to(&path)
                .with_context(|| format!("could not write {}", path.display()))?;
            println!("configuration written to {}", path.display());
            return Ok(());
        }
        None => {}
    }

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("could not parse config file {}", cli.config.display()))?;
    if let Some(dir) = cli.watch {
        config.watch.path = dir.to_string_lossy().into_owned();
    }

    let _guard = logging::init(&config.logger)?;

    info!(version = %semver(), "starting fsaudit");

    let root = config.watch_path();
    let (watcher, events) = RecursiveWatcher::spawn(&root)
        .with_context(|| format!("could not watch directory {}", root.display()))?;
    info!(directory = %root.display(), "watching directory");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = tokio::spawn(run_pipeline(events, TracingSink, shutdown_rx));

    wait_for_signal().await?;

    info!("shutting down");
    let _ = shutdown_tx.send(true);
    watcher.stop();
    consumer.await?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_carries_package_version() {
        let v = semver();
        assert!(v.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(v.contains('+'));
    }

    #[test]
    fn cli_parses_run_mode_with_overrides() {
        let cli = Cli::try_parse_from(["fsaudit", "--config", "alt.toml", "--watch", "/srv/data"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert_eq!(cli.watch, Some(PathBuf::from("/srv/data")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_configfile_with_default_path() {
        let cli = Cli::try_parse_from(["fsaudit", "configfile"]).unwrap();
        match cli.command {
            Some(Commands::Configfile { path }) => {
                assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_PATH));
            }
            other => panic!("expected Configfile, got {other:?}"),
        }
    }
}
