use crate::nats::traits::{JetStreamConsumer, PullConsumer};
use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream::Config as StreamConfig};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::info;

/// Thin wrapper around an async-nats connection plus its JetStream context.
pub struct NatsClient {
    jetstream: jetstream::Context,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: std::time::Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("failed to connect to NATS")?;

        let jetstream = jetstream::new(client);

        info!("connected to NATS");
        Ok(Self { jetstream })
    }

    /// Create the stream if it does not exist yet
    pub async fn ensure_stream(&self, stream_name: &str) -> Result<()> {
        let stream_config = StreamConfig {
            name: stream_name.to_string(),
            subjects: vec![format!("{}.>", stream_name)],
            description: Some("Stream for site change events".to_string()),
            ..Default::default()
        };

        match self.jetstream.get_stream(stream_name).await {
            Ok(_) => {
                info!(stream = %stream_name, "stream already exists");
            }
            Err(_) => {
                self.jetstream
                    .create_stream(stream_config)
                    .await
                    .context("failed to create stream")?;
                info!(stream = %stream_name, "created stream");
            }
        }

        Ok(())
    }

    /// Create a JetStreamConsumer trait object from this client
    pub fn create_consumer_client(&self) -> Arc<dyn JetStreamConsumer> {
        Arc::new(NatsJetStreamConsumer {
            context: self.jetstream.clone(),
        })
    }
}

/// Concrete implementation of JetStreamConsumer backed by async-nats
struct NatsJetStreamConsumer {
    context: jetstream::Context,
}

#[async_trait]
impl JetStreamConsumer for NatsJetStreamConsumer {
    async fn create_consumer(
        &self,
        config: jetstream::consumer::pull::Config,
        stream_name: &str,
    ) -> Result<Box<dyn PullConsumer>> {
        let consumer = self
            .context
            .create_consumer_on_stream(config, stream_name)
            .await
            .context("failed to create consumer")?;

        Ok(Box::new(NatsPullConsumer { consumer }))
    }
}

/// Concrete implementation of PullConsumer backed by async-nats
struct NatsPullConsumer {
    consumer: jetstream::consumer::PullConsumer,
}

#[async_trait]
impl PullConsumer for NatsPullConsumer {
    async fn fetch_messages(
        &self,
        max_messages: usize,
        expires: std::time::Duration,
    ) -> Result<Vec<jetstream::Message>> {
        let mut batch = self
            .consumer
            .batch()
            .max_messages(max_messages)
            .expires(expires)
            .messages()
            .await
            .context("failed to fetch message batch")?;

        let mut messages = Vec::new();
        while let Some(message) = batch.next().await {
            messages.push(
                message
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("failed to read message from batch")?,
            );
        }

        Ok(messages)
    }
}
