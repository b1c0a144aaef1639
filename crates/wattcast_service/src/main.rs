mod config;

use common::{init_telemetry, NatsClient, NatsObjectStoreClient, ObjectStorage, TelemetryConfig};
use config::ServiceConfig;
use forecast_worker::forecast_worker::{ForecastWorker, ForecastWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        service_name: "wattcast".to_string(),
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!("Starting wattcast service");
    debug!("Configuration: {:?}", config);

    // Initialize shared dependencies
    let (nats_client, storage) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {}", e);
            std::process::exit(1);
        }
    };

    let worker = match ForecastWorker::new(
        Arc::clone(&nats_client),
        storage,
        ForecastWorkerConfig {
            ingest_stream: config.ingest_stream.clone(),
            ingest_subject: config.ingest_subject.clone(),
            consumer_name: config.consumer_name.clone(),
            model_key: config.model_key.clone(),
            scratch_dir: config.scratch_dir.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize forecast worker: {}", e);
            std::process::exit(1);
        }
    };

    // Shutdown token owned by main for lifecycle coordination
    let shutdown_token = CancellationToken::new();
    let worker_handle = tokio::spawn(worker.run(shutdown_token.clone()));

    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, stopping worker");
    shutdown_token.cancel();

    match worker_handle.await {
        Ok(Ok(())) => info!("Forecast worker stopped"),
        Ok(Err(e)) => error!("Forecast worker exited with error: {}", e),
        Err(e) => error!("Forecast worker task failed: {}", e),
    }

    if let Ok(client) = Arc::try_unwrap(nats_client) {
        client.close().await;
    }
    info!("Shutdown complete");
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(Arc<NatsClient>, Arc<dyn ObjectStorage>)> {
    info!("Initializing NATS...");
    let nats_client = Arc::new(
        NatsClient::connect(
            &config.nats_url,
            Duration::from_secs(config.startup_timeout_secs),
        )
        .await?,
    );
    nats_client.ensure_stream(&config.ingest_stream).await?;

    info!(bucket = %config.object_store_bucket, "Initializing object store...");
    let storage: Arc<dyn ObjectStorage> = Arc::new(
        NatsObjectStoreClient::new(nats_client.jetstream(), &config.object_store_bucket).await?,
    );

    Ok((nats_client, storage))
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
