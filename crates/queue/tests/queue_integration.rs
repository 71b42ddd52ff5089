//! Queue integration tests.
//!
//! These tests verify the queue components work correctly together without
//! a Redis instance.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use fanout_core::testing::{MemoryData, MemoryStore, RecordedDelivery, RecordingDelivery};
use fanout_db::{entities::account, test_utils::account_fixture};
use fanout_queue::{DeliverJob, RawDistributionContext, RawDistributionJob, distribute};
use serde_json::json;

/// The external deliverer reads these field names.
#[test]
fn test_deliver_job_wire_format() {
    let job = DeliverJob::new(
        "alice".to_string(),
        "https://remote.example/inbox".to_string(),
        json!({"type": "EmojiReact"}),
    );

    assert_eq!(
        serde_json::to_value(&job).unwrap(),
        json!({
            "actor_id": "alice",
            "inbox": "https://remote.example/inbox",
            "activity": {"type": "EmojiReact"},
        })
    );
}

#[tokio::test]
async fn test_distribution_reaches_each_server_once() {
    let mut accounts = vec![account_fixture("author", None)];
    let mut follows = Vec::new();
    for (i, domain) in ["a.example", "a.example", "b.example", "c.example"]
        .iter()
        .enumerate()
    {
        let id = format!("f{i}");
        accounts.push(account::Model {
            shared_inbox_url: Some(format!("https://{domain}/inbox")),
            ..account_fixture(&id, Some(domain))
        });
        follows.push((id, "author".to_string()));
    }

    let store = Arc::new(MemoryStore::new(MemoryData {
        accounts,
        follows,
        ..Default::default()
    }));
    let delivery = RecordingDelivery::new();
    let ctx = RawDistributionContext::new(store, delivery.clone());

    let job = RawDistributionJob::new(json!({"type": "EmojiReact"}), "author".to_string());
    assert_eq!(distribute(&job, &ctx).await.unwrap(), 3);

    let inboxes: Vec<String> = delivery
        .deliveries()
        .await
        .into_iter()
        .filter_map(|d| match d {
            RecordedDelivery::Inbox { inbox, .. } => Some(inbox),
            RecordedDelivery::RawDistribution { .. } => None,
        })
        .collect();
    assert_eq!(
        inboxes,
        vec![
            "https://a.example/inbox",
            "https://b.example/inbox",
            "https://c.example/inbox",
        ]
    );
}
