use common::domain::{DomainError, DomainResult, Outcome};

/// Acknowledgement decision for a processed event: an HTTP-shaped status
/// for logging parity with the edge, and whether the broker should
/// redeliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventAck {
    pub http_status: u16,
    pub retry: bool,
}

impl EventAck {
    const fn done(http_status: u16) -> Self {
        Self {
            http_status,
            retry: false,
        }
    }

    const fn redeliver(http_status: u16) -> Self {
        Self {
            http_status,
            retry: true,
        }
    }
}

/// Map a processing result onto an acknowledgement.
///
/// Only availability failures ask for redelivery; malformed input and
/// absences would fail identically on every attempt.
pub fn project(result: &DomainResult<Outcome>) -> EventAck {
    match result {
        Ok(Outcome::Created) | Ok(Outcome::Deleted) => EventAck::done(202),
        Ok(Outcome::Updated) | Ok(Outcome::NoOp) => EventAck::done(200),
        Err(DomainError::SiteNotFound(_)) => EventAck::done(404),
        Err(DomainError::MalformedEnvelope(_)) | Err(DomainError::MalformedPayload(_)) => {
            EventAck::done(400)
        }
        Err(DomainError::ServiceUnavailable(_)) | Err(DomainError::StoreUnavailable(_)) => {
            EventAck::redeliver(503)
        }
        Err(DomainError::StoreError(_)) => EventAck::done(500),
    }
}
