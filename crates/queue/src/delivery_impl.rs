//! Redis-backed `ActivityPub` delivery implementation.
//!
//! Queues jobs in apalis-redis storages. Delivery jobs are consumed by the
//! signing HTTP deliverer, raw distribution jobs by
//! [`raw_distribution_worker`](crate::workers::raw_distribution_worker).

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use async_trait::async_trait;
use fanout_common::{AppError, AppResult};
use fanout_core::ActivityDelivery;
use serde_json::Value;
use tracing::{debug, info};

use crate::jobs::{DeliverJob, RawDistributionJob};

/// Redis-backed `ActivityPub` delivery service.
#[derive(Clone)]
pub struct RedisDeliveryService {
    deliver: RedisStorage<DeliverJob>,
    raw_distribution: RedisStorage<RawDistributionJob>,
}

impl RedisDeliveryService {
    /// Create a new Redis delivery service.
    #[must_use]
    pub const fn new(
        deliver: RedisStorage<DeliverJob>,
        raw_distribution: RedisStorage<RawDistributionJob>,
    ) -> Self {
        Self {
            deliver,
            raw_distribution,
        }
    }
}

#[async_trait]
impl ActivityDelivery for RedisDeliveryService {
    async fn queue_delivery(&self, activity: Value, actor_id: &str, inbox: &str) -> AppResult<()> {
        let job = DeliverJob::new(actor_id.to_string(), inbox.to_string(), activity);

        self.deliver
            .clone()
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to queue delivery: {e}")))?;

        debug!(actor_id = %actor_id, inbox = %inbox, "Queued delivery job");
        Ok(())
    }

    async fn queue_raw_distribution(
        &self,
        activity: Value,
        source_account_id: &str,
    ) -> AppResult<()> {
        let job = RawDistributionJob::new(activity, source_account_id.to_string());

        self.raw_distribution
            .clone()
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to queue raw distribution: {e}")))?;

        info!(source_account_id = %source_account_id, "Queued raw distribution job");
        Ok(())
    }
}
