//! Startup helpers for the Agena server.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::server::{self, AppState};

/// Variable naming an explicit env file instead of searching for `.env`.
pub const ENV_FILE_VAR: &str = "AGENA_ENV_FILE";

/// Load variables from an env file into the process environment.
///
/// With `path`, that file must exist. Without it, `.env` is searched in the
/// current directory and its parents; a missing file is not an error.
/// Variables already set in the environment are never overridden.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path).map(|()| Some(path.to_path_buf())),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e),
        },
    }
}

/// Run the server until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    // Before the subscriber so `RUST_LOG` from `.env` applies.
    let env_file = std::env::var_os(ENV_FILE_VAR).map(PathBuf::from);
    let dotenv = load_env_file(env_file.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Agena v{}", env!("CARGO_PKG_VERSION"));

    match dotenv {
        Ok(Some(path)) => tracing::info!("Loaded environment from {}", path.display()),
        Ok(None) => tracing::debug!("No .env file found"),
        Err(e) => {
            tracing::error!("Failed to load env file: {e}");
            return ExitCode::from(1);
        }
    }

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let state = match initialize(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(
        state,
        &config.server,
        shutdown_signal(),
    )) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Agena stopped");
    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if state creation fails.
pub fn initialize(config: &AppConfig) -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!(
        project = %config.vertex.project_id,
        location = %config.vertex.location,
        model = %config.vertex.model,
        "Vertex AI target"
    );
    if config.vertex.access_token.is_some() {
        tracing::info!("Using VERTEX_ACCESS_TOKEN for Vertex AI credentials");
    } else {
        tracing::info!("Using Google application default credentials");
    }

    AppState::from_config(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
