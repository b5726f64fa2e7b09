use std::sync::Arc;

use tokio::sync::broadcast;
use word_review_engine::config::Config;
use word_review_engine::learning::LearningService;
use word_review_engine::logging::{init_tracing, LogConfig};
use word_review_engine::store::Store;
use word_review_engine::workers::WorkerManager;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting word-review-engine");

    let store = match Store::open(&config.sled_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, path = %config.sled_path, "Failed to open sled database");
            std::process::exit(1);
        }
    };
    if let Err(e) = store.run_migrations() {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let service = match LearningService::from_config(store.clone(), &config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Invalid status thresholds");
            std::process::exit(1);
        }
    };
    let policy = service.policy();
    tracing::info!(
        mastered_at = policy.mastered_at,
        forgotten_at = policy.forgotten_at,
        forgotten_after_reviews = policy.forgotten_after_reviews,
        due_review_limit = service.due_review_limit(),
        "Learning service configured"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let worker_handle = if config.worker.is_leader {
        let worker_manager =
            WorkerManager::new(service, shutdown_tx.subscribe(), &config.worker);
        Some(tokio::spawn(async move {
            if let Err(e) = worker_manager.start().await {
                tracing::error!(error = %e, "Worker manager failed");
            }
        }))
    } else {
        tracing::info!("Not the worker leader; idling until shutdown");
        None
    };

    shutdown_signal(shutdown_tx).await;

    if let Some(handle) = worker_handle {
        match handle.await {
            Err(e) => tracing::error!(error = %e, "Worker task panicked"),
            Ok(()) => tracing::info!("Worker manager exited normally"),
        }
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler; waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
