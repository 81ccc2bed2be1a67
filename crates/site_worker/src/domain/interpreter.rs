use bytes::Bytes;
use common::domain::{
    DomainError, DomainResult, EventEnvelope, ATTRIBUTE_ENTITY_ID, ATTRIBUTE_EVENT_TYPE,
};

/// Entity id, operation kind and still-unparsed payload extracted from an
/// envelope's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedEvent {
    pub entity_id: String,
    pub event_kind: String,
    pub payload: Bytes,
}

/// Extract the entity id and operation kind from the envelope attributes.
///
/// The payload is returned unparsed; only Create/Update need a full record
/// and the caller parses it then. Pure function of its input.
pub fn interpret(envelope: &EventEnvelope) -> DomainResult<InterpretedEvent> {
    let entity_id = required_attribute(envelope, ATTRIBUTE_ENTITY_ID)?;
    let event_kind = required_attribute(envelope, ATTRIBUTE_EVENT_TYPE)?;

    Ok(InterpretedEvent {
        entity_id,
        event_kind,
        payload: envelope.payload.clone(),
    })
}

fn required_attribute(envelope: &EventEnvelope, name: &str) -> DomainResult<String> {
    match envelope.attributes.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(DomainError::MalformedEnvelope(format!(
            "envelope {} has an empty {} attribute",
            envelope.id, name
        ))),
        None => Err(DomainError::MalformedEnvelope(format!(
            "envelope {} is missing the {} attribute",
            envelope.id, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn envelope(attributes: HashMap<String, String>) -> EventEnvelope {
        EventEnvelope {
            id: "evt-1".to_string(),
            source: "//pubsub/site-events".to_string(),
            event_type: "google.cloud.pubsub.topic.v1.messagePublished".to_string(),
            attributes,
            payload: Bytes::from_static(b"{\"id\":\"site-1\"}"),
        }
    }

    fn attributes(entity_id: Option<&str>, event_type: Option<&str>) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(id) = entity_id {
            map.insert(ATTRIBUTE_ENTITY_ID.to_string(), id.to_string());
        }
        if let Some(kind) = event_type {
            map.insert(ATTRIBUTE_EVENT_TYPE.to_string(), kind.to_string());
        }
        map
    }

    #[test]
    fn test_interpret_extracts_id_kind_and_payload() {
        let envelope = envelope(attributes(Some("site-1"), Some("CREATE")));

        let event = interpret(&envelope).unwrap();
        assert_eq!(event.entity_id, "site-1");
        assert_eq!(event.event_kind, "CREATE");
        assert_eq!(event.payload, envelope.payload);
    }

    #[test]
    fn test_missing_entity_id_is_malformed() {
        let envelope = envelope(attributes(None, Some("CREATE")));

        let result = interpret(&envelope);
        assert!(matches!(result, Err(DomainError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_missing_event_type_is_malformed() {
        let envelope = envelope(attributes(Some("site-1"), None));

        let result = interpret(&envelope);
        assert!(matches!(result, Err(DomainError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_empty_entity_id_is_malformed() {
        let envelope = envelope(attributes(Some(""), Some("DELETE")));

        let result = interpret(&envelope);
        assert!(matches!(result, Err(DomainError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_interpret_leaves_envelope_untouched() {
        let original = envelope(attributes(Some("site-1"), Some("UPDATE")));
        let copy = original.clone();

        interpret(&original).unwrap();
        assert_eq!(original, copy);
    }
}
