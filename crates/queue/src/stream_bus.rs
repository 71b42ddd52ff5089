//! Redis Pub/Sub stream bus.
//!
//! Live sessions subscribe to `timeline:<account id>` and keep a
//! `subscribed:timeline:<account id>` key alive while connected. Nothing is
//! buffered for accounts without a session.

use std::sync::Arc;

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::{KeysInterface, PubsubInterface};
use fanout_common::{AppError, AppResult};
use fanout_core::{StreamBus, timeline_channel};
use tracing::debug;

use crate::keys::namespaced;

/// `StreamBus` publishing through Redis.
#[derive(Clone)]
pub struct RedisStreamBus {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisStreamBus {
    /// Create a new stream bus. `prefix` namespaces channels and keys.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String) -> Self {
        Self { redis, prefix }
    }

    fn subscription_key(&self, account_id: &str) -> String {
        namespaced(
            &self.prefix,
            &format!("subscribed:{}", timeline_channel(account_id)),
        )
    }
}

#[async_trait]
impl StreamBus for RedisStreamBus {
    async fn publish(&self, channel: &str, message: &str) -> AppResult<()> {
        let channel = namespaced(&self.prefix, channel);

        let receivers: i64 = self
            .redis
            .publish(channel.as_str(), message)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(channel = %channel, receivers, "Published stream message");
        Ok(())
    }

    async fn is_subscribed(&self, account_id: &str) -> AppResult<bool> {
        let exists: i64 = self
            .redis
            .exists(self.subscription_key(account_id))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        Ok(exists > 0)
    }
}
