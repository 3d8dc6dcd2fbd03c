use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cachette::api::{start_api_server, ApiState};
use cachette::observability::init_logging;
use cachette::services::{CounterService, PruneScheduler, SecretService};
use cachette::storage::create_repository;
use cachette::{Result, Settings, APP_NAME, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; must happen before any config is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("warning: error loading .env file: {}", e);
        }
    }

    let settings = Settings::from_env()?;
    init_logging(&settings.observability);

    info!(
        app_name = APP_NAME,
        version = VERSION,
        backend = %settings.database.backend,
        address = %settings.server.bind_address(),
        "starting cachette secret storage service"
    );

    // Repository: initial connect failure is fatal
    let repo = create_repository(&settings.database);
    repo.init().await?;
    repo.ping().await?;
    info!(backend = %settings.database.backend, "repository online");

    let service = Arc::new(SecretService::new(repo));
    service.ping().await?;
    service.set_ready(true);

    let counters = Arc::new(CounterService::new());
    let state = ApiState::new(
        service.clone(),
        counters,
        settings.auth.clone(),
        settings.hostname.clone(),
    );

    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => warn!(error = %e, "failed to install shutdown signal handler"),
        }
    });

    let pruner = PruneScheduler::new(service.clone(), settings.prune_interval());
    let pruner_task = tokio::spawn(pruner.run(shutdown.clone()));

    let served = start_api_server(&settings.server, state, shutdown.clone()).await;

    // stop the scheduler and release the repository exactly once
    shutdown.cancel();
    service.set_ready(false);
    if let Err(e) = pruner_task.await {
        warn!(error = %e, "prune scheduler task failed");
    }
    if let Err(e) = service.close().await {
        error!(error = %e, "error closing repository");
    }

    served?;
    info!("cachette shutdown completed");
    Ok(())
}
