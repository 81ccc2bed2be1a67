use crate::domain::{project, SiteEventService};
use bytes::Bytes;
use common::domain::EventEnvelope;
use common::nats::{ConsumeRequest, ConsumeResponse};
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{error, info};

/// Envelope as published on the stream. The operation payload travels
/// base64-free as an embedded JSON document.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    id: String,
    source: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    data: serde_json::Value,
}

impl WireEnvelope {
    fn into_domain(self) -> EventEnvelope {
        let payload = if self.data.is_null() {
            Bytes::new()
        } else {
            Bytes::from(self.data.to_string())
        };
        EventEnvelope {
            id: self.id,
            source: self.source,
            event_type: self.event_type,
            attributes: self.attributes,
            payload,
        }
    }
}

/// Tower service for processing individual site event messages.
///
/// Decodes the wire envelope, hands it to the domain service, and turns the
/// projected acknowledgement into an Ack or Nak. Envelopes that do not even
/// parse are acknowledged; redelivering them cannot help.
#[derive(Clone)]
pub struct SiteEventConsumerService {
    events: Arc<SiteEventService>,
}

impl SiteEventConsumerService {
    pub fn new(events: Arc<SiteEventService>) -> Self {
        Self { events }
    }
}

impl Service<ConsumeRequest> for SiteEventConsumerService {
    type Response = ConsumeResponse;
    type Error = anyhow::Error;
    type Future = BoxFuture<'static, Result<ConsumeResponse, anyhow::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConsumeRequest) -> Self::Future {
        let events = self.events.clone();

        Box::pin(async move {
            let wire: WireEnvelope = match serde_json::from_slice(&req.payload) {
                Ok(wire) => wire,
                Err(e) => {
                    error!(
                        error = %e,
                        subject = %req.subject,
                        "failed to decode event envelope"
                    );
                    return Ok(ConsumeResponse::ack());
                }
            };

            let envelope = wire.into_domain();
            let result = events.handle(&envelope).await;
            let ack = project(&result);

            match &result {
                Ok(outcome) => info!(
                    envelope_id = %envelope.id,
                    status = ack.http_status,
                    ?outcome,
                    "processed site event"
                ),
                Err(e) => error!(
                    envelope_id = %envelope.id,
                    status = ack.http_status,
                    retry = ack.retry,
                    error = %e,
                    "site event failed"
                ),
            }

            if ack.retry {
                Ok(ConsumeResponse::nak(format!(
                    "status {}: redelivery requested",
                    ack.http_status
                )))
            } else {
                Ok(ConsumeResponse::ack())
            }
        })
    }
}
