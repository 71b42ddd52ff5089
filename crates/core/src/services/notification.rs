//! Local notification service.

use chrono::Utc;
use fanout_common::AppResult;
use fanout_db::entities::notification::{self, NotificationType};
use serde::Serialize;
use tracing::debug;

use crate::generate_id;
use crate::services::{
    store::StoreService,
    stream_bus::{NOTIFICATION_EVENT, StreamBusService, StreamEnvelope, timeline_channel},
};

/// Notification pushed to a live timeline.
#[derive(Debug, Clone, Serialize)]
struct NotificationPayload<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    account_id: &'a str,
    activity_id: &'a str,
}

/// Notification service for local accounts.
#[derive(Clone)]
pub struct NotificationService {
    store: StoreService,
    bus: StreamBusService,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(store: StoreService, bus: StreamBusService) -> Self {
        Self { store, bus }
    }

    /// Notify `account_id` that `from_account_id` reacted.
    ///
    /// Returns `None` for self notifications and unknown recipients.
    pub async fn notify(
        &self,
        account_id: &str,
        activity_id: &str,
        activity_type: &str,
        from_account_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        // Don't notify yourself
        if account_id == from_account_id {
            return Ok(None);
        }

        if self.store.find_account(account_id).await?.is_none() {
            debug!(account_id = %account_id, "Recipient gone, skipping notification");
            return Ok(None);
        }

        let created = self
            .store
            .insert_notification(notification::Model {
                id: generate_id(),
                account_id: account_id.to_string(),
                from_account_id: from_account_id.to_string(),
                activity_id: activity_id.to_string(),
                activity_type: activity_type.to_string(),
                notification_type: NotificationType::EmojiReaction,
                created_at: Utc::now().into(),
            })
            .await?;

        if self.bus.is_subscribed(account_id).await? {
            let payload = serde_json::to_string(&NotificationPayload {
                id: &created.id,
                kind: "emoji_reaction",
                account_id: &created.from_account_id,
                activity_id: &created.activity_id,
            })?;
            let message = StreamEnvelope::new(NOTIFICATION_EVENT, payload).to_json()?;
            self.bus
                .publish(&timeline_channel(account_id), &message)
                .await?;
        }

        Ok(Some(created))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryData, MemoryStore, RecordingBus};
    use fanout_db::test_utils::account_fixture;
    use serde_json::Value;
    use std::sync::Arc;

    fn service(bus: Arc<RecordingBus>) -> (NotificationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(MemoryData {
            accounts: vec![account_fixture("author", None), account_fixture("fan", None)],
            ..Default::default()
        }));
        (NotificationService::new(store.clone(), bus), store)
    }

    #[tokio::test]
    async fn test_notify_inserts_and_streams() {
        let bus = RecordingBus::new();
        bus.subscribe("author").await;
        let (service, store) = service(bus.clone());

        let created = service
            .notify("author", "r1", "EmojiReaction", "fan")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.activity_type, "EmojiReaction");
        assert_eq!(store.snapshot().await.notifications.len(), 1);

        let published = bus.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "timeline:author");

        let envelope: Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(envelope["event"], "notification");
        let payload: Value = serde_json::from_str(envelope["payload"].as_str().unwrap()).unwrap();
        assert_eq!(payload["type"], "emoji_reaction");
        assert_eq!(payload["account_id"], "fan");
    }

    #[tokio::test]
    async fn test_notify_skips_self_and_unsubscribed_stream() {
        let bus = RecordingBus::new();
        let (service, store) = service(bus.clone());

        assert!(service.notify("author", "r1", "EmojiReaction", "author").await.unwrap().is_none());
        assert!(service.notify("author", "r2", "EmojiReaction", "fan").await.unwrap().is_some());

        assert_eq!(store.snapshot().await.notifications.len(), 1);
        assert!(bus.published().await.is_empty());
    }
}
