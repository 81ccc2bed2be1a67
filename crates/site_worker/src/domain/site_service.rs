use crate::resilience::{CircuitBreaker, RetryPolicy};
use chrono::Utc;
use common::domain::{
    DomainError, DomainResult, Outcome, SiteDocument, SiteProjectionCache, SiteRecord,
    SiteRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Name of the breaker guarding document store access
pub const DOCUMENT_STORE_BREAKER: &str = "document-store";

/// Domain service for site document mutations.
///
/// Every store call runs under the retry policy with the circuit breaker
/// inside it, so each individual attempt is admitted (or rejected) by the
/// breaker. Cache invalidation happens after a successful mutation and
/// never fails the event.
pub struct SiteService {
    repository: Arc<dyn SiteRepository>,
    cache: Arc<dyn SiteProjectionCache>,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl SiteService {
    pub fn new(
        repository: Arc<dyn SiteRepository>,
        cache: Arc<dyn SiteProjectionCache>,
        retry: RetryPolicy,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            repository,
            cache,
            retry,
            breaker,
        }
    }

    /// Write a new site document from the record, stamping both timestamps
    #[instrument(skip(self, record), fields(site_id = %record.id))]
    pub async fn create(&self, record: SiteRecord) -> DomainResult<Outcome> {
        let now = Utc::now();
        let document = SiteDocument {
            id: record.id.clone(),
            name: record.name,
            owner_id: record.owner_id,
            address: record.address,
            location: record.location,
            created_at: now,
            updated_at: now,
        };

        let saved = self
            .retry
            .run(|| self.breaker.call(self.repository.save(document.clone())))
            .await?;

        debug!(site_id = %saved.id, "created site document");
        self.invalidate_projection(&saved.id).await;
        Ok(Outcome::Created)
    }

    /// Merge the record over the existing document, preserving `created_at`
    #[instrument(skip(self, record), fields(site_id = %record.id))]
    pub async fn update(&self, record: SiteRecord) -> DomainResult<Outcome> {
        let existing = self.find_existing(&record.id).await?;

        let document = SiteDocument {
            id: existing.id,
            name: record.name,
            owner_id: record.owner_id,
            address: record.address,
            location: record.location,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let saved = self
            .retry
            .run(|| self.breaker.call(self.repository.save(document.clone())))
            .await?;

        debug!(site_id = %saved.id, "updated site document");
        self.invalidate_projection(&saved.id).await;
        Ok(Outcome::Updated)
    }

    /// Remove the document. Deleting an absent site is `SiteNotFound`, not
    /// a silent success, so redelivered deletes surface as 404s.
    #[instrument(skip(self))]
    pub async fn delete(&self, site_id: &str) -> DomainResult<Outcome> {
        self.find_existing(site_id).await?;

        self.retry
            .run(|| self.breaker.call(self.repository.delete_by_id(site_id)))
            .await?;

        debug!(site_id, "deleted site document");
        self.invalidate_projection(site_id).await;
        Ok(Outcome::Deleted)
    }

    async fn find_existing(&self, site_id: &str) -> DomainResult<SiteDocument> {
        self.retry
            .run(|| self.breaker.call(self.repository.find_by_id(site_id)))
            .await?
            .ok_or_else(|| DomainError::SiteNotFound(site_id.to_string()))
    }

    async fn invalidate_projection(&self, site_id: &str) {
        if let Err(e) = self.cache.invalidate(site_id).await {
            warn!(site_id, error = %e, "failed to invalidate site projection");
        }
    }
}
