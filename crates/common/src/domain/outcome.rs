/// Successful result of one envelope dispatch.
///
/// The failure side of a dispatch is `DomainError`; together they describe
/// everything the transport needs to acknowledge a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    /// Unrecognized event types are dropped without touching the store
    NoOp,
}
