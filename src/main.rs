//! MockUPI wallet server
//!
//! ```text
//! mockupi_wallet [--env|-e <name>] [--port <n>]
//! ```
//!
//! Reads `config/<env>.yaml` (default `dev`), opens the store and serves the
//! web app until stopped.

use std::sync::Arc;

use mockupi_wallet::config::{AppConfig, SECRET_KEY_ENV};
use mockupi_wallet::gateway::{self, state::AppState};
use mockupi_wallet::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        env = %env,
        git_hash = env!("GIT_HASH"),
        "Starting MockUPI wallet"
    );
    if app_config.ephemeral_secret {
        tracing::warn!(
            "{} not set; using a random session key. Sessions end on restart.",
            SECRET_KEY_ENV
        );
    }

    let state = AppState::from_config(&app_config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open database");
        anyhow::anyhow!("Failed to open database {}: {}", app_config.database_url, e)
    })?;
    tracing::info!(
        database_url = %app_config.database_url,
        qr_dir = %app_config.qr.dir,
        "Store ready"
    );

    gateway::run_server(
        &app_config.gateway.host,
        app_config.gateway.port,
        Arc::new(state),
    )
    .await
}
