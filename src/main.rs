use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use verdikt::api::routes::{create_router, AppState};
use verdikt::bus::RuleBus;
use verdikt::config::Config;
use verdikt::engine::Engine;
use verdikt::observability::{init_tracing, MetricsRegistry};
use verdikt::publish::{rules_file, RulePublisher};
use verdikt::store::RuleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting verdikt rule engine"
    );

    let metrics = Arc::new(MetricsRegistry::new());
    let bus = Arc::new(RuleBus::new(config.bus_capacity));

    // Workers subscribe before anything is published, so no update is missed.
    let (engine, workers, mut verdicts) = Engine::start(
        &bus,
        config.workers,
        config.intake_capacity,
        config.verdict_capacity,
        metrics.clone(),
    );

    // The API keeps its own replica for readiness reporting.
    let store = Arc::new(RuleStore::new());
    let mut store_feed = bus.subscribe();
    let store_replica = store.clone();
    let store_metrics = metrics.clone();
    let store_handle = tokio::spawn(async move {
        while let Some(update) = store_feed.recv().await {
            store_replica.apply_update(&update);
            store_metrics.record_update_applied();
        }
    });

    let publisher = RulePublisher::new(bus.clone(), metrics.clone());

    // Publish seed rules, if configured. A missing or bad file is logged and
    // the engine starts with no rules (everything passes vacuously).
    if let Some(ref rules_path) = config.rules_path {
        match rules_file::load_rules(rules_path) {
            Ok(rules) => {
                info!(
                    path = %rules_path.display(),
                    rules = rules.len(),
                    "Publishing seed rule set"
                );
                if let Ok(Err(e)) = publisher.publish(rules).await {
                    error!(error = %e, "Seed rule set publish failed");
                }
            }
            Err(e) => {
                error!(
                    path = %rules_path.display(),
                    error = %e,
                    "Failed to load seed rules, starting without rules"
                );
            }
        }
    }

    // Drain the verdict stream into structured logs. Violations also warn at
    // evaluation time; this is the complete pass/fail record.
    let sink_handle = tokio::spawn(async move {
        while let Some(verdict) = verdicts.recv().await {
            info!(
                transaction_id = %verdict.transaction_id,
                rule_id = %verdict.rule_id,
                passed = verdict.passed,
                reason = %verdict.reason,
                "verdict"
            );
        }
    });

    // Create application state
    let state = Arc::new(AppState {
        engine: engine.clone(),
        publisher,
        store,
        metrics,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    // Create router
    let app = create_router(state.clone());

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutting down...");

    // Refuse new rule hand-offs, then close the partition intakes and let
    // the workers drain. The verdict sink ends once the last worker exits.
    bus.close();
    drop(state);
    drop(engine);

    if tokio::time::timeout(config.shutdown_timeout(), workers.join())
        .await
        .is_err()
    {
        warn!("Workers did not drain within the shutdown timeout");
    }

    drop(bus);
    let _ = tokio::time::timeout(config.shutdown_timeout(), sink_handle).await;
    store_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
