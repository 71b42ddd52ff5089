//! Raw distribution worker.

use std::sync::Arc;

use apalis::prelude::*;
use fanout_common::AppResult;
use fanout_core::{DeliveryService, StoreService};
use tracing::{debug, error, info, warn};

use crate::jobs::RawDistributionJob;
use crate::shared_inbox::follower_inboxes;

/// Context for the raw distribution worker.
#[derive(Clone)]
pub struct RawDistributionContext {
    pub store: StoreService,
    /// Where per-inbox delivery jobs go.
    pub delivery: DeliveryService,
}

impl RawDistributionContext {
    /// Create a new raw distribution context.
    #[must_use]
    pub const fn new(store: StoreService, delivery: DeliveryService) -> Self {
        Self { store, delivery }
    }
}

/// Worker function for distributing an activity to follower inboxes.
///
/// # Errors
/// Returns an error if followers cannot be loaded or a delivery cannot be
/// queued; apalis retries the job.
pub async fn raw_distribution_worker(
    job: RawDistributionJob,
    ctx: Data<RawDistributionContext>,
) -> Result<(), Error> {
    match distribute(&job, &ctx).await {
        Ok(count) => {
            info!(
                source_account_id = %job.source_account_id,
                inbox_count = count,
                "Distributed activity to followers"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                source_account_id = %job.source_account_id,
                error = %e,
                "Failed to distribute activity"
            );
            Err(Error::Failed(Arc::new(Box::new(e))))
        }
    }
}

/// Queue one delivery per follower inbox and return how many were queued.
pub async fn distribute(job: &RawDistributionJob, ctx: &RawDistributionContext) -> AppResult<usize> {
    let Some(account) = ctx.store.find_account(&job.source_account_id).await? else {
        warn!(source_account_id = %job.source_account_id, "Source account is gone, dropping distribution");
        return Ok(0);
    };

    let followers = ctx.store.followers(&account.id).await?;
    let inboxes = follower_inboxes(&followers);

    // A failure part way fails the job; the retry re-queues inboxes already
    // queued, so a follower server may receive the activity twice
    for inbox in &inboxes {
        ctx.delivery
            .queue_delivery(job.activity.clone(), &account.id, inbox)
            .await?;
        debug!(inbox = %inbox, "Queued follower delivery");
    }

    Ok(inboxes.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fanout_common::AppError;
    use fanout_core::{
        ActivityDelivery,
        testing::{MemoryData, MemoryStore, RecordedDelivery, RecordingDelivery},
    };
    use fanout_db::{entities::account, test_utils::account_fixture};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fails the first delivery to `inbox`, records everything else.
    struct FlakyDelivery {
        inner: Arc<RecordingDelivery>,
        inbox: String,
        failed: AtomicBool,
    }

    #[async_trait]
    impl ActivityDelivery for FlakyDelivery {
        async fn queue_delivery(&self, activity: Value, actor_id: &str, inbox: &str) -> AppResult<()> {
            if inbox == self.inbox && !self.failed.swap(true, Ordering::SeqCst) {
                return Err(AppError::Queue("push failed".to_string()));
            }
            self.inner.queue_delivery(activity, actor_id, inbox).await
        }

        async fn queue_raw_distribution(
            &self,
            activity: Value,
            source_account_id: &str,
        ) -> AppResult<()> {
            self.inner
                .queue_raw_distribution(activity, source_account_id)
                .await
        }
    }

    fn job() -> RawDistributionJob {
        RawDistributionJob::new(json!({"type": "EmojiReact"}), "author".to_string())
    }

    #[tokio::test]
    async fn test_distributes_to_remote_follower_inboxes() {
        let store = Arc::new(MemoryStore::new(MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("local_fan", None),
                account::Model {
                    shared_inbox_url: Some("https://remote.example/inbox".to_string()),
                    ..account_fixture("remote_a", Some("remote.example"))
                },
                account::Model {
                    shared_inbox_url: Some("https://remote.example/inbox".to_string()),
                    ..account_fixture("remote_b", Some("remote.example"))
                },
            ],
            follows: vec![
                ("local_fan".to_string(), "author".to_string()),
                ("remote_a".to_string(), "author".to_string()),
                ("remote_b".to_string(), "author".to_string()),
            ],
            ..Default::default()
        }));
        let delivery = RecordingDelivery::new();
        let ctx = RawDistributionContext::new(store, delivery.clone());

        let count = distribute(&job(), &ctx).await.unwrap();
        assert_eq!(count, 1);

        let deliveries = delivery.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        match &deliveries[0] {
            RecordedDelivery::Inbox {
                activity,
                actor_id,
                inbox,
            } => {
                assert_eq!(actor_id, "author");
                assert_eq!(inbox, "https://remote.example/inbox");
                assert_eq!(activity["type"], "EmojiReact");
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_account_is_a_no_op() {
        let store = Arc::new(MemoryStore::new(MemoryData::default()));
        let delivery = RecordingDelivery::new();
        let ctx = RawDistributionContext::new(store, delivery.clone());

        assert_eq!(distribute(&job(), &ctx).await.unwrap(), 0);
        assert!(delivery.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_fails_job_and_retry_requeues_earlier_inboxes() {
        let store = Arc::new(MemoryStore::new(MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("alice", Some("a.example")),
                account_fixture("bob", Some("b.example")),
            ],
            follows: vec![
                ("alice".to_string(), "author".to_string()),
                ("bob".to_string(), "author".to_string()),
            ],
            ..Default::default()
        }));
        let recorded = RecordingDelivery::new();
        let delivery = Arc::new(FlakyDelivery {
            inner: recorded.clone(),
            inbox: "https://b.example/users/bob/inbox".to_string(),
            failed: AtomicBool::new(false),
        });
        let ctx = RawDistributionContext::new(store, delivery);

        assert!(matches!(distribute(&job(), &ctx).await, Err(AppError::Queue(_))));
        assert_eq!(distribute(&job(), &ctx).await.unwrap(), 2);

        let inboxes: Vec<String> = recorded
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
                "https://a.example/users/alice/inbox".to_string(),
                "https://a.example/users/alice/inbox".to_string(),
                "https://b.example/users/bob/inbox".to_string(),
            ]
        );
    }
}
