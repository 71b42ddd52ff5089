//! Redis integration tests.
//!
//! These tests require a running Redis instance.
//! Run with: `cargo test --test redis_integration -- --ignored`
//!
//! Set `REDIS_URL` environment variable to point to your Redis instance.
//! Default: <redis://localhost:6379>

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use fanout_core::{
    PayloadCache, StatusRenderer, StreamBus,
    testing::{MemoryData, MemoryStore},
};
use fanout_db::{
    entities::status::Visibility,
    test_utils::{account_fixture, status_fixture},
};
use fanout_federation::UrlConfig;
use fanout_queue::{RedisPayloadCache, RedisStreamBus};
use fred::clients::Client as RedisClient;
use fred::interfaces::{ClientLike, KeysInterface};
use fred::types::config::Config as RedisConfig;

fn get_redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

async fn connect() -> Arc<RedisClient> {
    let config = RedisConfig::from_url(&get_redis_url()).expect("Invalid REDIS_URL");
    let client = RedisClient::new(config, None, None, None);
    client.init().await.expect("Failed to connect to Redis");
    Arc::new(client)
}

fn prefix(test: &str) -> String {
    format!("fanout-test-{test}-{}", std::process::id())
}

/// Subscription is the presence of the `subscribed:` key.
#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_subscription_marker() {
    let redis = connect().await;
    let prefix = prefix("subscribed");
    let bus = RedisStreamBus::new(redis.clone(), prefix.clone());

    assert!(!bus.is_subscribed("alice").await.unwrap());

    let key = format!("{prefix}:subscribed:timeline:alice");
    redis
        .set::<(), _, _>(key.as_str(), "1", None, None, false)
        .await
        .unwrap();
    assert!(bus.is_subscribed("alice").await.unwrap());

    redis.del::<(), _>(key.as_str()).await.unwrap();
}

/// Publishing without listeners succeeds and is simply lost.
#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_publish_without_subscribers() {
    let bus = RedisStreamBus::new(connect().await, prefix("publish"));

    let result = bus
        .publish("timeline:nobody", r#"{"event":"emoji_reaction","payload":"{}"}"#)
        .await;
    assert!(result.is_ok(), "Failed to publish: {:?}", result.err());
}

/// Rendered payloads survive a round trip through Redis and are re-rendered
/// after invalidation.
#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_payload_cache_through_renderer() {
    let cache = Arc::new(RedisPayloadCache::new(connect().await, prefix("payload"), 60));
    let store = Arc::new(MemoryStore::new(MemoryData {
        accounts: vec![account_fixture("author", None)],
        statuses: vec![status_fixture("100", "author", Visibility::Public)],
        ..Default::default()
    }));
    let renderer = StatusRenderer::new(
        store.clone(),
        cache.clone(),
        UrlConfig::parse("https://local.example").unwrap(),
    );
    let status = store.snapshot().await.statuses[0].clone();

    let rendered = renderer.fetch(&status).await.unwrap();
    let cached = cache.get("100").await.unwrap().expect("payload was cached");
    assert_eq!(*cached, *rendered);

    cache.invalidate("100").await.unwrap();
    assert!(cache.get("100").await.unwrap().is_none());
}
