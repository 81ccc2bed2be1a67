use crate::domain::{interpret, SiteService};
use bytes::Bytes;
use common::domain::{DomainError, DomainResult, EventEnvelope, Outcome, SiteRecord};
use common::garde::validate_struct;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const EVENT_TYPE_CREATE: &str = "CREATE";
pub const EVENT_TYPE_UPDATE: &str = "UPDATE";
pub const EVENT_TYPE_DELETE: &str = "DELETE";

/// Routes interpreted site events to the matching mutation.
///
/// Unknown event kinds are acknowledged as no-ops rather than failed, so a
/// producer rolling out a new kind does not wedge the stream.
pub struct SiteEventService {
    sites: Arc<SiteService>,
}

impl SiteEventService {
    pub fn new(sites: Arc<SiteService>) -> Self {
        Self { sites }
    }

    #[instrument(skip(self, envelope), fields(envelope_id = %envelope.id))]
    pub async fn handle(&self, envelope: &EventEnvelope) -> DomainResult<Outcome> {
        let event = interpret(envelope)?;
        info!(
            entity_id = %event.entity_id,
            event_kind = %event.event_kind,
            "processing site event"
        );

        match event.event_kind.as_str() {
            EVENT_TYPE_CREATE => {
                let record = parse_site_record(&event.payload, &event.entity_id)?;
                self.sites.create(record).await
            }
            EVENT_TYPE_UPDATE => {
                let record = parse_site_record(&event.payload, &event.entity_id)?;
                self.sites.update(record).await
            }
            EVENT_TYPE_DELETE => self.sites.delete(&event.entity_id).await,
            other => {
                warn!(event_kind = %other, "ignoring unknown event kind");
                Ok(Outcome::NoOp)
            }
        }
    }
}

/// Parse and validate a site record payload, requiring the embedded id to
/// match the envelope's entity id.
fn parse_site_record(payload: &Bytes, entity_id: &str) -> DomainResult<SiteRecord> {
    let record: SiteRecord = serde_json::from_slice(payload)
        .map_err(|e| DomainError::MalformedPayload(format!("invalid site payload: {}", e)))?;

    validate_struct(&record)?;

    if record.id != entity_id {
        return Err(DomainError::MalformedPayload(format!(
            "payload id {} does not match entity id {}",
            record.id, entity_id
        )));
    }

    Ok(record)
}
