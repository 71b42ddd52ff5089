//! Shared status payload cache in Redis.

use std::sync::Arc;

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use fanout_common::{AppError, AppResult};
use fanout_core::{CachedPayload, PayloadCache};
use tracing::{debug, warn};

use crate::keys::namespaced;

/// `PayloadCache` storing JSON entries with a TTL.
#[derive(Clone)]
pub struct RedisPayloadCache {
    redis: Arc<RedisClient>,
    prefix: String,
    ttl_secs: i64,
}

impl RedisPayloadCache {
    /// Create a new payload cache.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String, ttl_secs: i64) -> Self {
        Self {
            redis,
            prefix,
            ttl_secs,
        }
    }

    fn cache_key(&self, status_id: &str) -> String {
        namespaced(&self.prefix, &format!("status_payload:{status_id}"))
    }
}

#[async_trait]
impl PayloadCache for RedisPayloadCache {
    async fn get(&self, status_id: &str) -> AppResult<Option<Arc<CachedPayload>>> {
        let key = self.cache_key(status_id);

        let result: Option<String> = self
            .redis
            .get(key.as_str())
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        let Some(json) = result else {
            debug!(status_id = %status_id, "Payload cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<CachedPayload>(&json) {
            Ok(payload) => Ok(Some(Arc::new(payload))),
            Err(e) => {
                // Entries written by an older payload shape are re-rendered
                warn!(status_id = %status_id, error = %e, "Discarding unreadable cached payload");
                Ok(None)
            }
        }
    }

    async fn put(&self, status_id: &str, payload: CachedPayload) -> AppResult<()> {
        let json = serde_json::to_string(&payload)?;

        self.redis
            .set::<(), _, _>(
                self.cache_key(status_id),
                json,
                Some(Expiration::EX(self.ttl_secs)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, status_id: &str) -> AppResult<()> {
        self.redis
            .del::<(), _>(self.cache_key(status_id))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(status_id = %status_id, "Invalidated cached payload");
        Ok(())
    }
}
