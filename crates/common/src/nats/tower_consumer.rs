use crate::nats::{ConsumeRequest, ConsumeResponse, JetStreamConsumer, PullConsumer};
use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::{debug, error, info, warn};

/// A JetStream pull consumer that hands each delivered message to a Tower
/// service and translates the returned `ConsumeResponse` into an ack or nak.
pub struct TowerConsumer<S> {
    consumer: Box<dyn PullConsumer>,
    stream_name: String,
    consumer_name: String,
    batch_size: usize,
    max_wait: Duration,
    service: S,
}

impl<S> TowerConsumer<S>
where
    S: Service<ConsumeRequest, Response = ConsumeResponse, Error = anyhow::Error>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    /// Create a durable pull consumer with explicit acks on the given stream
    pub async fn new(
        jetstream: Arc<dyn JetStreamConsumer>,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        service: S,
    ) -> Result<Self> {
        let config = async_nats::jetstream::consumer::pull::Config {
            name: Some(consumer_name.to_string()),
            durable_name: Some(consumer_name.to_string()),
            filter_subject: subject_filter.to_string(),
            ack_policy: async_nats::jetstream::consumer::AckPolicy::Explicit,
            ..Default::default()
        };

        let consumer = jetstream
            .create_consumer(config, stream_name)
            .await
            .context("failed to create consumer")?;

        debug!(
            stream = %stream_name,
            consumer = %consumer_name,
            filter_subject = %subject_filter,
            "consumer created"
        );

        Ok(Self {
            consumer,
            stream_name: stream_name.to_string(),
            consumer_name: consumer_name.to_string(),
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            service,
        })
    }

    /// Run the consume loop until cancellation
    pub async fn run(mut self, ctx: CancellationToken) -> Result<()> {
        debug!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "starting consumer loop"
        );

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(
                        stream = %self.stream_name,
                        consumer = %self.consumer_name,
                        "received shutdown signal, stopping consumer"
                    );
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(
                            stream = %self.stream_name,
                            error = %e,
                            "error processing batch"
                        );
                        // Keep consuming despite transient broker errors
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn fetch_and_process_batch(&mut self) -> Result<()> {
        let messages = self
            .consumer
            .fetch_messages(self.batch_size, self.max_wait)
            .await?;

        if messages.is_empty() {
            return Ok(());
        }

        debug!(message_count = messages.len(), "received message batch");

        for msg in &messages {
            let request = ConsumeRequest::new(
                msg.subject.to_string(),
                Bytes::copy_from_slice(&msg.payload),
            );

            let response = match self.service.call(request).await {
                Ok(response) => response,
                Err(e) => {
                    error!(
                        subject = %msg.subject,
                        error = %e,
                        "service error processing message"
                    );
                    ConsumeResponse::nak(e.to_string())
                }
            };

            match response {
                ConsumeResponse::Ack => {
                    if let Err(e) = msg.ack().await {
                        error!(subject = %msg.subject, error = %e, "failed to ack message");
                    }
                }
                ConsumeResponse::Nak(reason) => {
                    warn!(
                        subject = %msg.subject,
                        reason = reason.as_deref().unwrap_or("unspecified"),
                        "rejecting message for redelivery"
                    );
                    if let Err(e) = msg
                        .ack_with(async_nats::jetstream::AckKind::Nak(None))
                        .await
                    {
                        error!(subject = %msg.subject, error = %e, "failed to nak message");
                    }
                }
            }
        }

        Ok(())
    }
}
