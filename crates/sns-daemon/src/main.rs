//! Server binary for the SNS timeline service.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sns-config.yaml` (or `$SNS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the data directory as a [`FileStore`]
//! 4. Build the [`TimelineService`]
//! 5. Serve the gateway until `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use sns_core::config::{LogFormat, LoggingConfig};
use sns_core::{ServiceConfig, TimelineService};
use sns_gateway::{AppState, ServerConfig, start_server};
use sns_store::FileStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::DaemonError;

/// Config file read when `SNS_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "sns-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the data directory, or the server
/// fails.
#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let result = run().await;
    if let Err(e) = &result {
        error!(error = %e, "snsd exiting");
    }
    result
}

async fn run() -> Result<(), DaemonError> {
    // 1. Load configuration.
    let config_path = config_path(|name| std::env::var(name).ok());
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        config = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        data_dir = %config.storage.data_dir.display(),
        clear_on_start = config.storage.clear_on_start,
        "Configuration loaded"
    );

    // 3. Open the data directory.
    let store = Arc::new(FileStore::open(&config.storage.data_dir).await?);

    // 4. Build the service.
    let service = TimelineService::new(store, &config.timeline, config.storage.clear_on_start);
    let state = Arc::new(AppState::new(Arc::new(service)));

    // 5. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    start_server(&server_config, state, shutdown_signal()).await?;

    info!("snsd shutdown complete");
    Ok(())
}

/// Resolve the config file path from `SNS_CONFIG`.
fn config_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("SNS_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration, falling back to defaults when the file is absent,
/// then apply `SNS_*` environment overrides.
fn load_config(path: &std::path::Path) -> Result<ServiceConfig, DaemonError> {
    let mut config = if path.exists() {
        ServiceConfig::from_file(path)?
    } else {
        ServiceConfig::default()
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Resolve on the first Ctrl-C. If the handler cannot be installed the
/// server keeps running until the process is killed.
async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(error = %e, "Failed to listen for Ctrl-C, shutdown only by kill");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn config_path_defaults_to_working_directory() {
        assert_eq!(config_path(|_| None), PathBuf::from("sns-config.yaml"));
    }

    #[test]
    fn config_path_honours_sns_config() {
        let path = config_path(|name| (name == "SNS_CONFIG").then(|| "/etc/sns.yaml".to_owned()));
        assert_eq!(path, PathBuf::from("/etc/sns.yaml"));
    }

    #[test]
    fn defaults_without_overrides_serve_on_3010() {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config.server.port, 3010);
        assert_eq!(config.timeline.replay_limit, 20);
    }

    #[tokio::test]
    async fn shutdown_resolves_on_signal() {
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            wait_for_shutdown(async { Ok(()) }),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn failed_signal_handler_never_shuts_down() {
        let failed = async { Err(std::io::Error::other("no signal handler")) };
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            wait_for_shutdown(failed),
        )
        .await;
        assert!(waited.is_err());
    }
}
