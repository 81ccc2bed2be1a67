mod config;

use anyhow::Result;
use common::cache::MokaSiteCache;
use common::nats::NatsClient;
use common::store::InMemorySiteRepository;
use config::SiteProcessorConfig;
use site_worker::site_worker::{SiteWorker, SiteWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match SiteProcessorConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting site-processor service");
    info!("Configuration: {:?}", config);

    let ctx = CancellationToken::new();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, cancelling");
        signal_ctx.cancel();
    });

    if let Err(e) = run_service(ctx, config).await {
        error!(error = %e, "site-processor exited with error");
        std::process::exit(1);
    }

    info!("site-processor stopped gracefully");
}

async fn run_service(ctx: CancellationToken, config: SiteProcessorConfig) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);
    let nats_client = NatsClient::connect(&config.nats_url, startup_timeout).await?;
    nats_client.ensure_stream(&config.site_events_stream).await?;

    let repository = Arc::new(InMemorySiteRepository::new());
    let cache = Arc::new(MokaSiteCache::new(config.cache_capacity));

    let worker = SiteWorker::new(
        repository,
        cache,
        nats_client.create_consumer_client(),
        SiteWorkerConfig {
            stream: config.site_events_stream.clone(),
            subject: config.site_events_subject.clone(),
            consumer_name: config.consumer_name.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
            retry: config.retry_policy(),
            breaker: config.breaker_config(),
        },
    )
    .await?;

    worker.run(ctx).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
