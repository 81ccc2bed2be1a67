use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure taxonomy for one envelope dispatch.
///
/// `StoreUnavailable` marks a store-communication failure and is the only
/// retryable kind; `ServiceUnavailable` is its terminal form once the retry
/// budget is exhausted or the circuit breaker is open.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Document store unreachable: {0}")]
    StoreUnavailable(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Store error: {0}")]
    StoreError(#[from] anyhow::Error),
}

impl DomainError {
    /// Retrying can only change the result of a store-communication failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable(_))
    }

    /// Whether this failure counts toward the circuit breaker's failure rate.
    /// Domain absences and malformed input are not store failures.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            DomainError::StoreUnavailable(_) | DomainError::StoreError(_)
        )
    }
}
