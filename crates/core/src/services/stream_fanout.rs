//! Live delivery of rendered payloads to local timelines.
//!
//! Best effort and at-most-once: accounts without a live subscription are
//! skipped, and nothing is retried.

use fanout_common::AppResult;
use tracing::{debug, warn};

use crate::services::{
    scope::DistributionScope,
    store::StoreService,
    stream_bus::{StreamBusService, timeline_channel},
};

/// Publishes a payload to every subscribed local account in a status scope.
#[derive(Clone)]
pub struct StreamFanoutWorker {
    store: StoreService,
    bus: StreamBusService,
    scope: DistributionScope,
}

impl StreamFanoutWorker {
    #[must_use]
    pub fn new(store: StoreService, bus: StreamBusService) -> Self {
        Self {
            scope: DistributionScope::new(store.clone()),
            store,
            bus,
        }
    }

    /// Publish `payload` for a status to the local audience.
    ///
    /// A status or acting account that no longer exists makes this a
    /// successful no-op.
    pub async fn run(&self, payload: &str, status_id: &str, acting_account_id: &str) -> AppResult<()> {
        let Some(status) = self.store.find_status(status_id).await? else {
            debug!(status_id = %status_id, "Status gone, skipping stream fan-out");
            return Ok(());
        };

        let Some(actor) = self.store.find_account(acting_account_id).await? else {
            debug!(account_id = %acting_account_id, "Account gone, skipping stream fan-out");
            return Ok(());
        };

        let ids = self.scope.scope_for(&status).await?;
        let accounts = self.store.find_accounts(&ids).await?;

        let mut published = 0usize;
        for account in accounts {
            if !account.is_end_user() {
                continue;
            }

            match self.bus.is_subscribed(&account.id).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "Subscription check failed");
                    continue;
                }
            }

            if let Some(domain) = &actor.domain {
                if account.excluded_timeline_domains().contains(domain) {
                    continue;
                }
            }

            match self.bus.publish(&timeline_channel(&account.id), payload).await {
                Ok(()) => published += 1,
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "Failed to publish to timeline");
                }
            }
        }

        debug!(status_id = %status_id, published, "Stream fan-out finished");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryData, MemoryStore, RecordingBus};
    use chrono::Utc;
    use fanout_db::{
        entities::{
            account::{self, ActorType},
            status::{self, Visibility},
        },
        test_utils::{account_fixture, status_fixture},
    };
    use serde_json::json;
    use std::sync::Arc;

    async fn worker(data: MemoryData, subscribed: &[&str]) -> (StreamFanoutWorker, Arc<RecordingBus>) {
        let bus = RecordingBus::new();
        for id in subscribed {
            bus.subscribe(id).await;
        }
        let worker = StreamFanoutWorker::new(Arc::new(MemoryStore::new(data)), bus.clone());
        (worker, bus)
    }

    fn channels(published: &[(String, String)]) -> Vec<&str> {
        published.iter().map(|(c, _)| c.as_str()).collect()
    }

    #[tokio::test]
    async fn test_publishes_only_to_subscribed_end_users() {
        let data = MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("live", None),
                account_fixture("idle", None),
                account::Model {
                    actor_type: ActorType::Service,
                    ..account_fixture("bot", None)
                },
            ],
            statuses: vec![status_fixture("s", "author", Visibility::Public)],
            ..Default::default()
        };
        let (worker, bus) = worker(data, &["live", "bot"]).await;

        worker.run("{}", "s", "author").await.unwrap();

        assert_eq!(channels(&bus.published().await), vec!["timeline:live"]);
    }

    #[tokio::test]
    async fn test_respects_excluded_domains_for_remote_actor() {
        let data = MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("reactor", Some("noisy.example")),
                account::Model {
                    exclude_timeline_domains: json!(["noisy.example"]),
                    ..account_fixture("picky", None)
                },
                account_fixture("open", None),
            ],
            statuses: vec![status_fixture("s", "author", Visibility::Public)],
            ..Default::default()
        };
        let (worker, bus) = worker(data, &["picky", "open"]).await;

        worker.run("{}", "s", "reactor").await.unwrap();

        assert_eq!(channels(&bus.published().await), vec!["timeline:open"]);
    }

    #[tokio::test]
    async fn test_private_status_stays_with_followers() {
        let data = MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("follower", None),
                account_fixture("stranger", None),
            ],
            statuses: vec![status_fixture("s", "author", Visibility::Private)],
            follows: vec![("follower".to_string(), "author".to_string())],
            ..Default::default()
        };
        let (worker, bus) = worker(data, &["author", "follower", "stranger"]).await;

        worker.run("payload", "s", "follower").await.unwrap();

        let published = bus.published().await;
        assert_eq!(channels(&published), vec!["timeline:author", "timeline:follower"]);
        assert!(published.iter().all(|(_, message)| message == "payload"));
    }

    #[tokio::test]
    async fn test_missing_status_or_account_is_a_noop() {
        let data = MemoryData {
            accounts: vec![account_fixture("author", None)],
            statuses: vec![status::Model {
                deleted_at: Some(Utc::now().into()),
                ..status_fixture("deleted", "author", Visibility::Public)
            }],
            ..Default::default()
        };
        let (worker, bus) = worker(data, &["author"]).await;

        assert!(worker.run("{}", "deleted", "author").await.is_ok());
        assert!(worker.run("{}", "missing", "author").await.is_ok());
        assert!(worker.run("{}", "deleted", "ghost").await.is_ok());
        assert!(bus.published().await.is_empty());
    }
}
