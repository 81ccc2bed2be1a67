use crate::domain::{DomainResult, SiteDocument, SiteRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory site document store keyed by id.
///
/// Backs the all-in-one binary and the pipeline integration tests; a
/// production deployment substitutes a real document-store driver behind
/// the same `SiteRepository` trait.
#[derive(Default)]
pub struct InMemorySiteRepository {
    documents: RwLock<HashMap<String, SiteDocument>>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn find_by_id(&self, site_id: &str) -> DomainResult<Option<SiteDocument>> {
        Ok(self.documents.read().await.get(site_id).cloned())
    }

    async fn save(&self, document: SiteDocument) -> DomainResult<SiteDocument> {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn delete_by_id(&self, site_id: &str) -> DomainResult<()> {
        self.documents.write().await.remove(site_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(id: &str) -> SiteDocument {
        let now = Utc::now();
        SiteDocument {
            id: id.to_string(),
            name: "Test Site".to_string(),
            owner_id: "user-1".to_string(),
            address: "1 Test St".to_string(),
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let repo = InMemorySiteRepository::new();
        repo.save(document("site-1")).await.unwrap();

        let found = repo.find_by_id("site-1").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some("site-1".to_string()));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = InMemorySiteRepository::new();
        assert!(repo.find_by_id("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_id() {
        let repo = InMemorySiteRepository::new();
        repo.save(document("site-1")).await.unwrap();

        let mut replacement = document("site-1");
        replacement.name = "Renamed".to_string();
        repo.save(replacement).await.unwrap();

        let found = repo.find_by_id("site-1").await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let repo = InMemorySiteRepository::new();
        repo.save(document("site-1")).await.unwrap();
        repo.delete_by_id("site-1").await.unwrap();
        assert!(repo.is_empty().await);
    }
}
