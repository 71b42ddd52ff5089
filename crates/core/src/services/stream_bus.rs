//! Real-time stream bus.
//!
//! Provides an abstraction for publishing to per-account live channels.
//! The actual implementation is provided by the queue crate (Redis Pub/Sub).
//! Publishing is at-most-once: nothing is stored for absent subscribers.

use async_trait::async_trait;
use fanout_common::AppResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::reaction_group::ReactionGroup;

/// Event name of a reaction update.
pub const EMOJI_REACTION_EVENT: &str = "emoji_reaction";

/// Event name of a new notification.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Name of the personal live channel of an account.
#[must_use]
pub fn timeline_channel(account_id: &str) -> String {
    format!("timeline:{account_id}")
}

/// Message published on a channel.
///
/// `payload` is itself JSON-encoded, so clients decode it per event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    pub event: String,
    pub payload: String,
}

impl StreamEnvelope {
    #[must_use]
    pub fn new(event: &str, payload: String) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reaction group pushed to live timelines, tagged with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiReactionPayload {
    #[serde(flatten)]
    pub group: ReactionGroup,
    pub status_id: String,
}

/// Trait for the real-time bus.
#[async_trait]
pub trait StreamBus: Send + Sync {
    /// Publish a message on a channel.
    async fn publish(&self, channel: &str, message: &str) -> AppResult<()>;

    /// Whether the account currently holds a live subscription.
    async fn is_subscribed(&self, account_id: &str) -> AppResult<bool>;
}

/// A no-op implementation of `StreamBus`. Nobody is ever subscribed.
#[derive(Clone, Default)]
pub struct NoOpStreamBus;

#[async_trait]
impl StreamBus for NoOpStreamBus {
    async fn publish(&self, _channel: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }

    async fn is_subscribed(&self, _account_id: &str) -> AppResult<bool> {
        Ok(false)
    }
}

/// Wrapper for boxed `StreamBus` trait object.
pub type StreamBusService = Arc<dyn StreamBus>;
