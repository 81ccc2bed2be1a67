use crate::domain::{SiteEventService, SiteService, DOCUMENT_STORE_BREAKER};
use crate::nats::SiteEventConsumerService;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, RetryPolicy};
use common::domain::{SiteProjectionCache, SiteRepository};
use common::nats::{JetStreamConsumer, TowerConsumer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct SiteWorkerConfig {
    pub stream: String,
    pub subject: String,
    pub consumer_name: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
    pub retry: RetryPolicy,
    pub breaker: CircuitBreakerConfig,
}

/// Wires the site event pipeline onto a JetStream pull consumer.
pub struct SiteWorker {
    consumer: TowerConsumer<SiteEventConsumerService>,
}

impl SiteWorker {
    pub async fn new(
        repository: Arc<dyn SiteRepository>,
        cache: Arc<dyn SiteProjectionCache>,
        jetstream: Arc<dyn JetStreamConsumer>,
        config: SiteWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("initializing site worker");

        let breaker = Arc::new(CircuitBreaker::new(DOCUMENT_STORE_BREAKER, config.breaker));
        let sites = Arc::new(SiteService::new(repository, cache, config.retry, breaker));
        let events = Arc::new(SiteEventService::new(sites));
        let processor = SiteEventConsumerService::new(events);

        let consumer = TowerConsumer::new(
            jetstream,
            &config.stream,
            &config.consumer_name,
            &config.subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            processor,
        )
        .await?;

        info!("site worker initialized");
        Ok(Self { consumer })
    }

    /// Consume until the token is cancelled
    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.consumer.run(ctx).await
    }
}
