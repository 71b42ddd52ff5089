//! Emoji reaction service.

use chrono::Utc;
use fanout_common::{AppError, AppResult};
use fanout_db::{
    entities::{account, custom_emoji, emoji_reaction, status},
    repositories::IdRange,
};
use fanout_federation::{ReactionToActivity, UrlConfig};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::generate_id;
use crate::services::{
    delivery::DeliveryService,
    emoji::{EmojiName, validate_reaction},
    jobs::JobSender,
    payload_cache::PayloadCacheService,
    policy::{ReactionContext, can_react},
    reaction_group::{ReactionGroup, ReactionGroups},
    store::StoreService,
    stream_bus::{EMOJI_REACTION_EVENT, EmojiReactionPayload, StreamEnvelope},
};

/// Activity type recorded on reaction notifications.
pub const EMOJI_REACTION_ACTIVITY: &str = "EmojiReaction";

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 40;

/// Id-based page of an account's reactions.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub max_id: Option<String>,
    pub since_id: Option<String>,
    pub min_id: Option<String>,
    /// Clamped to 1..=40, 20 when absent.
    pub limit: Option<u64>,
}

impl Page {
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    store: StoreService,
    delivery: DeliveryService,
    cache: PayloadCacheService,
    jobs: JobSender,
    urls: UrlConfig,
    local_domain: String,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        store: StoreService,
        delivery: DeliveryService,
        cache: PayloadCacheService,
        jobs: JobSender,
        urls: UrlConfig,
        local_domain: String,
    ) -> Self {
        Self {
            store,
            delivery,
            cache,
            jobs,
            urls,
            local_domain,
        }
    }

    /// React to a status.
    ///
    /// Returns `None` when `name` refers to a remote custom emoji that cannot
    /// be rendered here. Delivery and stream fan-out are scheduled, not
    /// awaited.
    pub async fn react(
        &self,
        account_id: &str,
        status_id: &str,
        name: &str,
    ) -> AppResult<Option<emoji_reaction::Model>> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

        let status = self.target_status(status_id).await?;

        let author = self
            .store
            .find_account(&status.account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(status.account_id.clone()))?;

        let context = ReactionContext::load(self.store.as_ref(), &account, &author, &status).await?;
        if !can_react(&context) {
            return Err(AppError::Forbidden(format!(
                "Account {account_id} may not react to status {}",
                status.id
            )));
        }

        let emoji_name = EmojiName::parse(name, &self.local_domain);

        if self
            .store
            .find_reaction(&account.id, &status.id, &emoji_name.shortcode)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateReaction(name.to_string()));
        }

        let custom_emoji = self
            .store
            .find_custom_emoji(&emoji_name.shortcode, emoji_name.domain.as_deref())
            .await?;

        // Remote emoji may only join an existing reaction on this status
        if emoji_name.is_foreign() {
            let known = match &custom_emoji {
                Some(emoji) => {
                    self.store
                        .reaction_exists_with_emoji(&status.id, &emoji.id)
                        .await?
                }
                None => false,
            };
            if !known {
                debug!(status_id = %status.id, name = %name, "Unknown remote emoji, ignoring reaction");
                return Ok(None);
            }
        }

        validate_reaction(&emoji_name.shortcode, custom_emoji.as_ref())?;

        let now = Utc::now().into();
        let reaction = self
            .store
            .insert_reaction(emoji_reaction::Model {
                id: generate_id(),
                account_id: account.id.clone(),
                status_id: status.id.clone(),
                name: emoji_name.shortcode.clone(),
                custom_emoji_id: custom_emoji.as_ref().map(|e| e.id.clone()),
                uri: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        // Committed from here on: later failures are logged, never returned
        if let Err(e) = self.store.touch_status(&status.id).await {
            warn!(status_id = %status.id, error = %e, "Failed to touch status");
        }
        if let Err(e) = self.cache.invalidate(&status.id).await {
            warn!(status_id = %status.id, error = %e, "Failed to invalidate cached payload");
        }

        let domain = custom_emoji.as_ref().and_then(|e| e.domain.as_deref());
        let group = match ReactionGroups::load(self.store.as_ref(), &status.id, None).await {
            Ok(groups) => groups.find(&reaction.name, domain).cloned(),
            Err(e) => {
                warn!(status_id = %status.id, error = %e, "Failed to load reaction groups");
                None
            }
        };

        info!(
            reaction_id = %reaction.id,
            account_id = %account.id,
            status_id = %status.id,
            name = %reaction.name,
            "Reaction created"
        );

        self.dispatch(&account, &author, &status, &reaction, custom_emoji.as_ref(), group)
            .await;

        Ok(Some(reaction))
    }

    /// Reactions of an account, newest first.
    pub async fn list_reactions(
        &self,
        account_id: &str,
        page: &Page,
    ) -> AppResult<Vec<emoji_reaction::Model>> {
        let range = IdRange {
            max_id: page.max_id.clone(),
            since_id: page.since_id.clone(),
            min_id: page.min_id.clone(),
        };

        self.store
            .account_reactions(account_id, &range, page.limit())
            .await
    }

    /// The status reacted to: the original when `status_id` is a reblog.
    async fn target_status(&self, status_id: &str) -> AppResult<status::Model> {
        let status = self
            .store
            .find_status(status_id)
            .await?
            .ok_or_else(|| AppError::StatusNotFound(status_id.to_string()))?;

        let Some(original_id) = &status.reblog_of_id else {
            return Ok(status);
        };

        Ok(self.store.find_status(original_id).await?.unwrap_or(status))
    }

    /// Schedule notification, federation and stream work. Failures are
    /// logged and never surface to the caller.
    async fn dispatch(
        &self,
        account: &account::Model,
        author: &account::Model,
        status: &status::Model,
        reaction: &emoji_reaction::Model,
        emoji: Option<&custom_emoji::Model>,
        group: Option<ReactionGroup>,
    ) {
        if author.is_local() {
            if let Err(e) = self.jobs.local_notification(
                &author.id,
                &reaction.id,
                EMOJI_REACTION_ACTIVITY,
                &account.id,
            ) {
                warn!(reaction_id = %reaction.id, error = %e, "Failed to enqueue notification");
            }
        }

        let remote_emoji = emoji.is_some_and(|e| !e.is_local());
        let to_author = !author.is_local() && author.is_activitypub() && !status.local_only;
        let to_followers = author.is_local() && !remote_emoji && !status.local_only;

        if to_author || to_followers {
            match self.build_activity(account, author, status, reaction, emoji) {
                Ok(activity) => {
                    if to_author {
                        self.deliver_to_author(activity.clone(), account, author, reaction)
                            .await;
                    }
                    if to_followers {
                        if let Err(e) = self
                            .delivery
                            .queue_raw_distribution(activity, &author.id)
                            .await
                        {
                            warn!(reaction_id = %reaction.id, error = %e, "Failed to queue raw distribution");
                        }
                    }
                }
                Err(e) => {
                    warn!(reaction_id = %reaction.id, error = %e, "Failed to build reaction activity");
                }
            }
        }

        let Some(group) = group else {
            warn!(reaction_id = %reaction.id, "Reaction group missing, skipping stream fan-out");
            return;
        };

        match stream_message(group, &status.id) {
            Ok(message) => {
                if let Err(e) = self.jobs.stream_fanout(message, &status.id, &account.id) {
                    warn!(reaction_id = %reaction.id, error = %e, "Failed to enqueue stream fan-out");
                }
            }
            Err(e) => warn!(reaction_id = %reaction.id, error = %e, "Failed to render stream payload"),
        }
    }

    async fn deliver_to_author(
        &self,
        activity: Value,
        account: &account::Model,
        author: &account::Model,
        reaction: &emoji_reaction::Model,
    ) {
        let Some(inbox) = author.inbox_url.as_deref().filter(|i| !i.is_empty()) else {
            warn!(account_id = %author.id, "Remote author has no inbox");
            return;
        };

        if let Err(e) = self.delivery.queue_delivery(activity, &account.id, inbox).await {
            warn!(reaction_id = %reaction.id, inbox = %inbox, error = %e, "Failed to queue delivery");
        }
    }

    fn build_activity(
        &self,
        account: &account::Model,
        author: &account::Model,
        status: &status::Model,
        reaction: &emoji_reaction::Model,
        emoji: Option<&custom_emoji::Model>,
    ) -> AppResult<Value> {
        let activity = reaction.to_activity(&self.urls, account, status, author, emoji)?;
        Ok(serde_json::to_value(activity)?)
    }
}

/// `emoji_reaction` envelope for live timelines.
fn stream_message(group: ReactionGroup, status_id: &str) -> AppResult<String> {
    let payload = serde_json::to_string(&EmojiReactionPayload {
        group,
        status_id: status_id.to_string(),
    })?;
    StreamEnvelope::new(EMOJI_REACTION_EVENT, payload).to_json()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{
        jobs::{JobService, JobWorkerContext},
        notification::NotificationService,
        payload_cache::{CachedPayload, MemoryPayloadCache, PayloadCache},
        stream_fanout::StreamFanoutWorker,
    };
    use async_trait::async_trait;
    use crate::testing::{MemoryData, MemoryStore, RecordedDelivery, RecordingBus, RecordingDelivery};
    use fanout_common::config::JobsConfig;
    use fanout_db::{
        entities::{account::ReactionPolicy, status::Visibility},
        test_utils::{account_fixture, custom_emoji_fixture, reaction_fixture, status_fixture},
    };
    use std::sync::Arc;
    use tokio::task::JoinHandle;

    struct Harness {
        store: Arc<MemoryStore>,
        delivery: Arc<RecordingDelivery>,
        bus: Arc<RecordingBus>,
        service: ReactionService,
        jobs: JoinHandle<()>,
    }

    /// Cache whose backend is unreachable.
    struct DownCache;

    #[async_trait]
    impl PayloadCache for DownCache {
        async fn get(&self, _status_id: &str) -> AppResult<Option<Arc<CachedPayload>>> {
            Err(AppError::Redis("down".to_string()))
        }

        async fn put(&self, _status_id: &str, _payload: CachedPayload) -> AppResult<()> {
            Err(AppError::Redis("down".to_string()))
        }

        async fn invalidate(&self, _status_id: &str) -> AppResult<()> {
            Err(AppError::Redis("down".to_string()))
        }
    }

    impl Harness {
        fn new(data: MemoryData) -> Self {
            Self::with_cache(data, Arc::new(MemoryPayloadCache::default()))
        }

        fn with_cache(data: MemoryData, cache: PayloadCacheService) -> Self {
            let store = Arc::new(MemoryStore::new(data));
            let delivery = RecordingDelivery::new();
            let bus = RecordingBus::new();

            let job_service = JobService::new(&JobsConfig::default());
            let service = ReactionService::new(
                store.clone(),
                delivery.clone(),
                cache,
                job_service.sender(),
                UrlConfig::parse("https://local.example").unwrap(),
                "local.example".to_string(),
            );
            let jobs = job_service
                .start(JobWorkerContext {
                    stream_fanout: StreamFanoutWorker::new(store.clone(), bus.clone()),
                    notifications: NotificationService::new(store.clone(), bus.clone()),
                })
                .unwrap();

            Self {
                store,
                delivery,
                bus,
                service,
                jobs,
            }
        }

        /// Drop the service and wait for queued jobs to drain.
        async fn drain(self) -> (Arc<MemoryStore>, Arc<RecordingDelivery>, Arc<RecordingBus>) {
            drop(self.service);
            self.jobs.await.unwrap();
            (self.store, self.delivery, self.bus)
        }
    }

    fn public_status_data(author_domain: Option<&str>) -> MemoryData {
        MemoryData {
            accounts: vec![
                account_fixture("author", author_domain),
                account_fixture("viewer", None),
            ],
            statuses: vec![status_fixture("100", "author", Visibility::Public)],
            follows: vec![("viewer".to_string(), "author".to_string())],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_react_publishes_to_local_author() {
        let harness = Harness::new(public_status_data(None));
        harness.bus.subscribe("author").await;

        let reaction = harness
            .service
            .react("viewer", "100", "👍")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reaction.name, "👍");

        let (store, delivery, bus) = harness.drain().await;
        let data = store.snapshot().await;
        assert_eq!(data.reactions.len(), 1);
        assert_eq!(data.notifications.len(), 1);
        assert_eq!(data.notifications[0].account_id, "author");

        let (channel, envelope) = bus
            .published()
            .await
            .into_iter()
            .map(|(channel, message)| {
                (channel, serde_json::from_str::<StreamEnvelope>(&message).unwrap())
            })
            .find(|(_, envelope)| envelope.event == EMOJI_REACTION_EVENT)
            .unwrap();
        assert_eq!(channel, "timeline:author");
        let payload: serde_json::Value = serde_json::from_str(&envelope.payload).unwrap();
        assert_eq!(payload["status_id"], "100");
        assert_eq!(payload["name"], "👍");
        assert_eq!(payload["count"], 1);

        // Local author: followers get the activity, nobody is addressed directly
        let deliveries = delivery.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert!(matches!(
            &deliveries[0],
            RecordedDelivery::RawDistribution { source_account_id, .. } if source_account_id == "author"
        ));
    }

    #[tokio::test]
    async fn test_react_delivers_to_remote_author() {
        let harness = Harness::new(public_status_data(Some("remote.example")));

        harness.service.react("viewer", "100", "👍").await.unwrap();

        let (store, delivery, _) = harness.drain().await;
        assert_eq!(store.snapshot().await.reactions.len(), 1);
        assert!(store.snapshot().await.notifications.is_empty());

        let deliveries = delivery.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        match &deliveries[0] {
            RecordedDelivery::Inbox {
                activity,
                actor_id,
                inbox,
            } => {
                assert_eq!(actor_id, "viewer");
                assert_eq!(inbox, "https://remote.example/users/author/inbox");
                assert_eq!(activity["type"], "EmojiReact");
                assert_eq!(activity["content"], "👍");
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_remote_emoji_is_ignored() {
        let harness = Harness::new(public_status_data(None));

        let result = harness
            .service
            .react("viewer", "100", "tinking@example.com")
            .await
            .unwrap();
        assert!(result.is_none());

        let (store, delivery, bus) = harness.drain().await;
        assert!(store.snapshot().await.reactions.is_empty());
        assert!(delivery.deliveries().await.is_empty());
        assert!(bus.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_emoji_joins_existing_reaction() {
        let mut data = public_status_data(None);
        data.accounts.push(account_fixture("other", Some("example.com")));
        data.emojis
            .push(custom_emoji_fixture("e1", "tinking", Some("example.com")));
        data.reactions.push(emoji_reaction::Model {
            custom_emoji_id: Some("e1".to_string()),
            ..reaction_fixture("r0", "other", "100", "tinking")
        });
        let harness = Harness::new(data);

        let reaction = harness
            .service
            .react("viewer", "100", ":tinking@example.com:")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reaction.name, "tinking");
        assert_eq!(reaction.custom_emoji_id.as_deref(), Some("e1"));

        // Remote emoji stay off the author's follower distribution
        let (_, delivery, _) = harness.drain().await;
        assert!(delivery.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_outage_after_insert_still_succeeds() {
        let harness = Harness::with_cache(public_status_data(None), Arc::new(DownCache));
        harness.bus.subscribe("author").await;

        let reaction = harness.service.react("viewer", "100", "👍").await.unwrap();
        assert!(reaction.is_some());

        let (store, _, bus) = harness.drain().await;
        assert_eq!(store.snapshot().await.reactions.len(), 1);
        assert!(
            bus.published()
                .await
                .iter()
                .any(|(channel, _)| channel == "timeline:author")
        );
    }

    #[tokio::test]
    async fn test_duplicate_reaction_is_rejected() {
        let harness = Harness::new(public_status_data(None));

        harness.service.react("viewer", "100", "😀").await.unwrap();
        let second = harness.service.react("viewer", "100", "😀").await;
        assert!(matches!(second, Err(AppError::DuplicateReaction(_))));

        let (store, _, _) = harness.drain().await;
        assert_eq!(store.snapshot().await.reactions.len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_emoji() {
        let harness = Harness::new(public_status_data(None));

        let result = harness.service.react("viewer", "100", "not_an_emoji").await;
        assert!(matches!(result, Err(AppError::UnrecognizedEmoji(_))));
        assert!(harness.store.snapshot().await.reactions.is_empty());
    }

    #[tokio::test]
    async fn test_local_custom_emoji() {
        let mut data = public_status_data(None);
        data.emojis.push(custom_emoji_fixture("e2", "blobcat", None));
        let harness = Harness::new(data);

        let reaction = harness
            .service
            .react("viewer", "100", ":blobcat:")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reaction.name, "blobcat");
        assert_eq!(reaction.custom_emoji_id.as_deref(), Some("e2"));
    }

    #[tokio::test]
    async fn test_forbidden_when_author_rejects_reactions() {
        let mut data = public_status_data(None);
        data.accounts[0].reaction_policy = ReactionPolicy::Block;
        let harness = Harness::new(data);

        let result = harness.service.react("viewer", "100", "👍").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_forbidden_on_invisible_status() {
        let mut data = public_status_data(None);
        data.statuses[0].visibility = Visibility::Direct;
        let harness = Harness::new(data);

        let result = harness.service.react("viewer", "100", "👍").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_status_and_account() {
        let harness = Harness::new(public_status_data(None));

        assert!(matches!(
            harness.service.react("viewer", "404", "👍").await,
            Err(AppError::StatusNotFound(_))
        ));
        assert!(matches!(
            harness.service.react("ghost", "100", "👍").await,
            Err(AppError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_only_status_is_not_federated() {
        let mut data = public_status_data(None);
        data.statuses[0].local_only = true;
        let harness = Harness::new(data);

        harness.service.react("viewer", "100", "👍").await.unwrap();

        let (_, delivery, _) = harness.drain().await;
        assert!(delivery.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_reaction_on_reblog_targets_original() {
        let mut data = public_status_data(None);
        data.accounts.push(account_fixture("booster", None));
        data.statuses.push(status::Model {
            reblog_of_id: Some("100".to_string()),
            ..status_fixture("200", "booster", Visibility::Public)
        });
        let harness = Harness::new(data);

        let reaction = harness
            .service
            .react("viewer", "200", "👍")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reaction.status_id, "100");
    }

    #[tokio::test]
    async fn test_reaction_touches_status() {
        let harness = Harness::new(public_status_data(None));
        let before = harness.store.snapshot().await.statuses[0].updated_at;

        harness.service.react("viewer", "100", "👍").await.unwrap();

        let after = harness.store.snapshot().await.statuses[0].updated_at;
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_list_reactions_pages() {
        let mut data = public_status_data(None);
        for i in 1..=3 {
            data.reactions
                .push(reaction_fixture(&format!("r{i}"), "viewer", "100", "👍"));
        }
        let harness = Harness::new(data);

        let page = Page {
            limit: Some(2),
            ..Default::default()
        };
        let first = harness.service.list_reactions("viewer", &page).await.unwrap();
        let ids: Vec<_> = first.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2"]);

        let next = Page {
            max_id: Some("r2".to_string()),
            ..Default::default()
        };
        let rest = harness.service.list_reactions("viewer", &next).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "r1");
    }

    #[test]
    fn test_page_limit_is_clamped() {
        assert_eq!(Page::default().limit(), 20);
        assert_eq!(Page { limit: Some(0), ..Default::default() }.limit(), 1);
        assert_eq!(Page { limit: Some(500), ..Default::default() }.limit(), 40);
    }
}
