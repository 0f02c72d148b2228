// SPDX-License-Identifier: MPL-2.0

use chrono::Utc;
use pulse::api::{ApiServer, AppState, ServerError};
use pulse::config::{self, APP_NAME};
use pulse::runtime;
use pulse::state::ServerSettings;
use pulse::store::{EventStore, seed_demo};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    fmt().with_env_filter(filter).init();

    let seed = std::env::args().skip(1).any(|arg| arg == "--seed");
    let settings = ServerSettings::load();

    match run(&settings, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed: {}", APP_NAME, e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &ServerSettings, seed: bool) -> Result<(), ServerError> {
    let path = match &settings.database_path {
        Some(path) => path.clone(),
        None => EventStore::default_path()?,
    };

    info!("Opening event store at {}", path.display());
    let store = EventStore::open(&path, settings.busy_timeout())?;

    if seed {
        seed_demo(&store, Utc::now())?;
    }

    let state = Arc::new(AppState::new(store, settings));
    let server = ApiServer::start(state, &settings.bind_address, settings.worker_threads())?;

    runtime::block_on(shutdown_signal());
    server.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
