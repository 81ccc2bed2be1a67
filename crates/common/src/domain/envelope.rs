use bytes::Bytes;
use std::collections::HashMap;

/// Attribute carrying the id of the entity the event refers to.
pub const ATTRIBUTE_ENTITY_ID: &str = "entity_id";

/// Attribute carrying the operation kind (CREATE, UPDATE, DELETE, ...).
pub const ATTRIBUTE_EVENT_TYPE: &str = "event_type";

/// A decoded event envelope as handed over by the inbound transport.
///
/// The payload stays opaque until an operation requires a full record;
/// the envelope is immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    /// Unique per delivery, not globally deduplicated
    pub id: String,
    /// URI of the system that emitted the event
    pub source: String,
    /// Transport-level event type
    pub event_type: String,
    /// Unordered metadata, carries at least `entity_id` and `event_type`
    pub attributes: HashMap<String, String>,
    /// Operation payload, structure is operation-specific
    pub payload: Bytes,
}
