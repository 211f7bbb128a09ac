use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewatch::application::dispatcher::AlertDispatcher;
use pricewatch::application::scheduler::Scheduler;
use pricewatch::application::services::monitor::MonitorService;
use pricewatch::config::MonitorConfig;
use pricewatch::infrastructure::fetcher::ReqwestFetcher;
use pricewatch::infrastructure::notifier::LogNotifier;
use pricewatch::persistence::init_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env();
    info!(
        "Price monitor starting: cycle every {}s, up to {} concurrent fetches",
        config.cycle_interval_secs, config.max_concurrent_fetches
    );

    let pool = init_database(&config.database_url).await?;

    let fetcher = Arc::new(ReqwestFetcher::new(config.fetch_timeout())?);
    let monitor = Arc::new(MonitorService::new(pool.clone(), fetcher, &config));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn the periodic monitoring loop
    let scheduler = Scheduler::new(monitor.clone(), &config);
    let scheduler_shutdown = shutdown_rx.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_shutdown).await;
    });

    // Spawn the unsent-alert dispatcher
    let dispatcher = AlertDispatcher::new(pool.clone(), Arc::new(LogNotifier), &config);
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(shutdown_rx).await;
    });

    // Wait for Ctrl+C or SIGTERM
    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Price monitor running. Press Ctrl+C to stop.");
    shutdown_signal.await;

    info!("Shutting down gracefully...");
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    let _ = dispatcher_handle.await;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}
