use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Geographic position of a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoLocation {
    #[garde(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[garde(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Site state as carried in a Create/Update event payload.
///
/// The id comes from the upstream source of truth and is authoritative;
/// this service never generates identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SiteRecord {
    #[garde(length(min = 1))]
    pub id: String,
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub owner_id: String,
    #[garde(skip)]
    pub address: String,
    #[garde(dive)]
    pub location: Option<GeoLocation>,
}

/// Document-store representation of a site.
///
/// `id` and `created_at` are immutable after the first write; `updated_at`
/// is rewritten on every successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDocument {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub address: String,
    pub location: Option<GeoLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for site document persistence.
///
/// Communication failures must surface as `DomainError::StoreUnavailable`
/// so they stay distinguishable from `Ok(None)` (not found) and from
/// unclassified store failures (`DomainError::StoreError`).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Look up a site document by id
    async fn find_by_id(&self, site_id: &str) -> DomainResult<Option<SiteDocument>>;

    /// Write a site document, overwriting any existing document with the same id
    async fn save(&self, document: SiteDocument) -> DomainResult<SiteDocument>;

    /// Remove a site document by id
    async fn delete_by_id(&self, site_id: &str) -> DomainResult<()>;
}

/// Cached read-side projection of sites, keyed by site id.
/// Invalidation is fire-and-forget at the call site.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SiteProjectionCache: Send + Sync {
    async fn invalidate(&self, site_id: &str) -> DomainResult<()>;
}
