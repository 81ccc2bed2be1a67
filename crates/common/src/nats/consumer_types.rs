use bytes::Bytes;

/// Owned view of one delivered message, detached from the NATS client types
/// so consumer services can be tested without a broker.
#[derive(Debug, Clone)]
pub struct ConsumeRequest {
    /// The subject the message was published to
    pub subject: String,
    /// The message payload
    pub payload: Bytes,
}

impl ConsumeRequest {
    pub fn new(subject: String, payload: Bytes) -> Self {
        Self { subject, payload }
    }
}

/// Disposition for one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeResponse {
    /// Processing is finished, terminal outcomes included - acknowledge
    Ack,
    /// Processing should be retried - reject for redelivery
    Nak(Option<String>),
}

impl ConsumeResponse {
    pub fn ack() -> Self {
        Self::Ack
    }

    pub fn nak(reason: impl Into<String>) -> Self {
        Self::Nak(Some(reason.into()))
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, Self::Ack)
    }

    pub fn is_nak(&self) -> bool {
        matches!(self, Self::Nak(_))
    }
}
