use bytes::Bytes;
use common::cache::MokaSiteCache;
use common::domain::SiteRepository;
use common::nats::{ConsumeRequest, ConsumeResponse};
use common::store::InMemorySiteRepository;
use site_worker::domain::{SiteEventService, SiteService, DOCUMENT_STORE_BREAKER};
use site_worker::nats::SiteEventConsumerService;
use site_worker::resilience::{CircuitBreaker, CircuitBreakerConfig, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

struct Pipeline {
    repository: Arc<InMemorySiteRepository>,
    cache: Arc<MokaSiteCache>,
    consumer: SiteEventConsumerService,
}

fn pipeline() -> Pipeline {
    let repository = Arc::new(InMemorySiteRepository::new());
    let cache = Arc::new(MokaSiteCache::new(100));

    let sites = Arc::new(SiteService::new(
        repository.clone(),
        cache.clone(),
        RetryPolicy::new(3, Duration::from_millis(1)),
        Arc::new(CircuitBreaker::new(
            DOCUMENT_STORE_BREAKER,
            CircuitBreakerConfig::default(),
        )),
    ));
    let consumer = SiteEventConsumerService::new(Arc::new(SiteEventService::new(sites)));

    Pipeline {
        repository,
        cache,
        consumer,
    }
}

fn event(entity_id: &str, event_type: &str, data: &str) -> ConsumeRequest {
    let body = format!(
        r#"{{
            "id": "evt-{entity_id}",
            "source": "//pubsub/site-events",
            "type": "message-published",
            "attributes": {{"entity_id": "{entity_id}", "event_type": "{event_type}"}},
            "data": {data}
        }}"#
    );
    ConsumeRequest::new(format!("site_events.{entity_id}"), Bytes::from(body))
}

fn site_data(id: &str, name: &str) -> String {
    format!(
        r#"{{"id":"{id}","name":"{name}","owner_id":"user-7","address":"1 Solar Way","location":{{"latitude":45.5,"longitude":-122.6}}}}"#
    )
}

#[tokio::test]
async fn test_create_then_update_preserves_created_at() {
    let mut p = pipeline();

    let response = p
        .consumer
        .call(event("site-1", "CREATE", &site_data("site-1", "Rooftop Array")))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);

    let created = p
        .repository
        .find_by_id("site-1")
        .await
        .unwrap()
        .expect("document should exist after create");
    assert_eq!(created.name, "Rooftop Array");
    assert_eq!(created.created_at, created.updated_at);

    let response = p
        .consumer
        .call(event("site-1", "UPDATE", &site_data("site-1", "Hillside Farm")))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);

    let updated = p
        .repository
        .find_by_id("site-1")
        .await
        .unwrap()
        .expect("document should survive update");
    assert_eq!(updated.name, "Hillside Farm");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_delete_twice_acks_both_deliveries() {
    let mut p = pipeline();

    p.consumer
        .call(event("site-1", "CREATE", &site_data("site-1", "Rooftop Array")))
        .await
        .unwrap();

    let first = p.consumer.call(event("site-1", "DELETE", "null")).await.unwrap();
    assert_eq!(first, ConsumeResponse::Ack);
    assert!(p.repository.find_by_id("site-1").await.unwrap().is_none());

    // second delete is a terminal not-found, acknowledged rather than redelivered
    let second = p.consumer.call(event("site-1", "DELETE", "null")).await.unwrap();
    assert_eq!(second, ConsumeResponse::Ack);
}

#[tokio::test]
async fn test_update_before_create_acks_without_writing() {
    let mut p = pipeline();

    let response = p
        .consumer
        .call(event("site-9", "UPDATE", &site_data("site-9", "Ghost Site")))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);
    assert!(p.repository.is_empty().await);
}

#[tokio::test]
async fn test_unknown_event_kind_leaves_store_untouched() {
    let mut p = pipeline();

    p.consumer
        .call(event("site-1", "CREATE", &site_data("site-1", "Rooftop Array")))
        .await
        .unwrap();

    let response = p
        .consumer
        .call(event("site-1", "ARCHIVE", "null"))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);

    let document = p.repository.find_by_id("site-1").await.unwrap().unwrap();
    assert_eq!(document.name, "Rooftop Array");
}

#[tokio::test]
async fn test_mutations_invalidate_cached_projection() {
    let mut p = pipeline();

    p.consumer
        .call(event("site-1", "CREATE", &site_data("site-1", "Rooftop Array")))
        .await
        .unwrap();

    let document = p.repository.find_by_id("site-1").await.unwrap().unwrap();
    p.cache.put(document.clone()).await;
    assert!(p.cache.get("site-1").await.is_some());

    p.consumer
        .call(event("site-1", "UPDATE", &site_data("site-1", "Hillside Farm")))
        .await
        .unwrap();

    assert!(p.cache.get("site-1").await.is_none());
}

#[tokio::test]
async fn test_malformed_records_never_reach_the_store() {
    let mut p = pipeline();

    // invalid latitude
    let bad_location = r#"{"id":"site-1","name":"Rooftop","owner_id":"user-7","address":"1 Solar Way","location":{"latitude":99.0,"longitude":0.0}}"#;
    let response = p
        .consumer
        .call(event("site-1", "CREATE", bad_location))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);
    assert!(p.repository.is_empty().await);

    // id mismatch between payload and envelope attributes
    let response = p
        .consumer
        .call(event("site-2", "CREATE", &site_data("site-1", "Rooftop Array")))
        .await
        .unwrap();
    assert_eq!(response, ConsumeResponse::Ack);
    assert!(p.repository.is_empty().await);
}
