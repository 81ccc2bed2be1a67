use crate::domain::{DomainResult, SiteDocument, SiteProjectionCache};
use async_trait::async_trait;
use moka::future::Cache;

/// In-process response cache for site projections, bounded by entry count.
pub struct MokaSiteCache {
    sites: Cache<String, SiteDocument>,
}

impl MokaSiteCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            sites: Cache::new(max_capacity),
        }
    }

    pub async fn get(&self, site_id: &str) -> Option<SiteDocument> {
        self.sites.get(site_id).await
    }

    pub async fn put(&self, document: SiteDocument) {
        self.sites.insert(document.id.clone(), document).await;
    }
}

#[async_trait]
impl SiteProjectionCache for MokaSiteCache {
    async fn invalidate(&self, site_id: &str) -> DomainResult<()> {
        self.sites.invalidate(site_id).await;
        Ok(())
    }
}
