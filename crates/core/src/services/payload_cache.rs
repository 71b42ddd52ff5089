//! Shared, viewer-agnostic status payload cache.
//!
//! Entries are immutable: a newer rendering replaces the `Arc` under the key,
//! readers holding the old one keep a consistent value.

use async_trait::async_trait;
use fanout_common::AppResult;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::services::render::StatusPayload;

/// A rendered status and the status version it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPayload {
    pub version: i64,
    pub payload: StatusPayload,
}

/// Trait for the payload cache.
#[async_trait]
pub trait PayloadCache: Send + Sync {
    async fn get(&self, status_id: &str) -> AppResult<Option<Arc<CachedPayload>>>;

    async fn put(&self, status_id: &str, payload: CachedPayload) -> AppResult<()>;

    /// Drop the entry so the next read re-renders.
    async fn invalidate(&self, status_id: &str) -> AppResult<()>;
}

/// In-process `PayloadCache`.
#[derive(Clone, Default)]
pub struct MemoryPayloadCache {
    entries: Arc<RwLock<HashMap<String, Arc<CachedPayload>>>>,
}

impl MemoryPayloadCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayloadCache for MemoryPayloadCache {
    async fn get(&self, status_id: &str) -> AppResult<Option<Arc<CachedPayload>>> {
        Ok(self.entries.read().await.get(status_id).cloned())
    }

    async fn put(&self, status_id: &str, payload: CachedPayload) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(status_id.to_string(), Arc::new(payload));
        Ok(())
    }

    async fn invalidate(&self, status_id: &str) -> AppResult<()> {
        self.entries.write().await.remove(status_id);
        Ok(())
    }
}

/// Wrapper for boxed `PayloadCache` trait object.
pub type PayloadCacheService = Arc<dyn PayloadCache>;
