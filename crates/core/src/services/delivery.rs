//! `ActivityPub` delivery service.
//!
//! Provides an abstraction for queueing outbound activities. Delivery is
//! at-least-once: the queue crate persists every job and retries it.

use async_trait::async_trait;
use fanout_common::AppResult;
use serde_json::Value;
use std::sync::Arc;

/// Trait for `ActivityPub` delivery.
///
/// This allows the core services to queue activities without directly
/// depending on the queue implementation.
#[async_trait]
pub trait ActivityDelivery: Send + Sync {
    /// Queue delivery of an activity to a single inbox.
    ///
    /// # Arguments
    /// * `activity` - The serialized activity
    /// * `actor_id` - The ID of the account whose key signs the request
    /// * `inbox` - The destination inbox URL
    async fn queue_delivery(&self, activity: Value, actor_id: &str, inbox: &str)
    -> AppResult<()>;

    /// Queue distribution of an activity to every follower inbox of an account.
    ///
    /// # Arguments
    /// * `activity` - The serialized activity
    /// * `source_account_id` - The account whose followers receive it
    async fn queue_raw_distribution(
        &self,
        activity: Value,
        source_account_id: &str,
    ) -> AppResult<()>;
}

/// A no-op implementation of `ActivityDelivery` for when federation is disabled.
#[derive(Clone, Default)]
pub struct NoOpDelivery;

#[async_trait]
impl ActivityDelivery for NoOpDelivery {
    async fn queue_delivery(
        &self,
        _activity: Value,
        _actor_id: &str,
        _inbox: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn queue_raw_distribution(
        &self,
        _activity: Value,
        _source_account_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `ActivityDelivery` trait object.
pub type DeliveryService = Arc<dyn ActivityDelivery>;
