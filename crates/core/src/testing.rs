//! In-memory fakes of the storage, delivery and bus seams.
//!
//! `MemoryStore` mirrors the semantics of the sea-orm repositories closely
//! enough for service tests: soft-deleted statuses are invisible to
//! `find_status`, reactions are unique per `(account, status, name)`, and
//! paging follows the same id ordering.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fanout_common::{AppError, AppResult};
use fanout_db::{
    entities::{
        account, application, custom_emoji, domain_block, emoji_reaction,
        friend_domain::{self, FriendState},
        instance_info, mention, notification, poll, poll_vote, relay, status,
    },
    repositories::{FilterWithRules, IdRange},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::services::{delivery::ActivityDelivery, store::SocialStore, stream_bus::StreamBus};

/// Contents of a [`MemoryStore`]. Relationship tables are `(account, target)` pairs.
#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub accounts: Vec<account::Model>,
    pub statuses: Vec<status::Model>,
    pub mentions: Vec<mention::Model>,
    /// `(follower, followed)`
    pub follows: Vec<(String, String)>,
    /// `(blocker, blocked)`
    pub blocks: Vec<(String, String)>,
    /// `(account, domain)`
    pub account_domain_blocks: Vec<(String, String)>,
    /// `(account, status)`
    pub favourites: Vec<(String, String)>,
    /// `(account, status)`
    pub bookmarks: Vec<(String, String)>,
    /// `(account, status)`
    pub pins: Vec<(String, String)>,
    /// `(account, conversation)`
    pub conversation_mutes: Vec<(String, String)>,
    pub applications: Vec<application::Model>,
    pub polls: Vec<poll::Model>,
    pub poll_votes: Vec<poll_vote::Model>,
    pub filters: Vec<FilterWithRules>,
    pub reactions: Vec<emoji_reaction::Model>,
    pub emojis: Vec<custom_emoji::Model>,
    pub relays: Vec<relay::Model>,
    pub instance_infos: Vec<instance_info::Model>,
    pub domain_blocks: Vec<domain_block::Model>,
    pub friend_domains: Vec<friend_domain::Model>,
    pub notifications: Vec<notification::Model>,
}

impl MemoryData {
    fn account(&self, id: &str) -> Option<&account::Model> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn follower_ids(&self, account_id: &str) -> Vec<String> {
        self.follows
            .iter()
            .filter(|(_, target)| target == account_id)
            .map(|(follower, _)| follower.clone())
            .collect()
    }

    fn followers(&self, account_id: &str) -> Vec<account::Model> {
        let ids = self.follower_ids(account_id);
        self.accounts
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect()
    }
}

fn has_pair(pairs: &[(String, String)], left: &str, right: &str) -> bool {
    pairs.iter().any(|(l, r)| l == left && r == right)
}

fn matches_deleted_at(
    status: &status::Model,
    deleted_at: Option<DateTimeWithTimeZone>,
) -> bool {
    status.deleted_at.is_none() || (deleted_at.is_some() && status.deleted_at == deleted_at)
}

/// [`SocialStore`] over plain vectors.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> MemoryData {
        self.data.read().await.clone()
    }

    /// Mutate the contents in place.
    pub async fn update<F: FnOnce(&mut MemoryData)>(&self, f: F) {
        f(&mut *self.data.write().await);
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn find_account(&self, id: &str) -> AppResult<Option<account::Model>> {
        Ok(self.data.read().await.account(id).cloned())
    }

    async fn find_accounts(&self, ids: &[String]) -> AppResult<Vec<account::Model>> {
        let data = self.data.read().await;
        Ok(data
            .accounts
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn find_accounts_in_domains(
        &self,
        ids: &[String],
        domains: &[String],
    ) -> AppResult<Vec<account::Model>> {
        let data = self.data.read().await;
        Ok(data
            .accounts
            .iter()
            .filter(|a| ids.contains(&a.id))
            .filter(|a| a.domain.as_ref().is_some_and(|d| domains.contains(d)))
            .cloned()
            .collect())
    }

    async fn local_account_ids(&self) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .accounts
            .iter()
            .filter(|a| a.is_local())
            .map(|a| a.id.clone())
            .collect())
    }

    async fn followers(&self, account_id: &str) -> AppResult<Vec<account::Model>> {
        Ok(self.data.read().await.followers(account_id))
    }

    async fn local_follower_ids(&self, account_id: &str) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .followers(account_id)
            .into_iter()
            .filter(account::Model::is_local)
            .map(|a| a.id)
            .collect())
    }

    async fn followers_outside_blocked_domains(
        &self,
        account_id: &str,
        domain_blocker_id: &str,
    ) -> AppResult<Vec<account::Model>> {
        let data = self.data.read().await;
        Ok(data
            .followers(account_id)
            .into_iter()
            .filter(|f| match &f.domain {
                Some(domain) => !has_pair(&data.account_domain_blocks, domain_blocker_id, domain),
                None => true,
            })
            .collect())
    }

    async fn is_following(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.follows,
            account_id,
            target_account_id,
        ))
    }

    async fn is_blocking(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.blocks,
            account_id,
            target_account_id,
        ))
    }

    async fn is_domain_blocking(&self, account_id: &str, domain: &str) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.account_domain_blocks,
            account_id,
            domain,
        ))
    }

    async fn find_status(&self, id: &str) -> AppResult<Option<status::Model>> {
        let data = self.data.read().await;
        Ok(data
            .statuses
            .iter()
            .find(|s| s.id == id && !s.is_deleted())
            .cloned())
    }

    async fn mentions(&self, status_id: &str) -> AppResult<Vec<mention::Model>> {
        let data = self.data.read().await;
        Ok(data
            .mentions
            .iter()
            .filter(|m| m.status_id == status_id)
            .cloned()
            .collect())
    }

    async fn reblogger_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .statuses
            .iter()
            .filter(|s| s.reblog_of_id.as_deref() == Some(status_id))
            .filter(|s| matches_deleted_at(s, deleted_at))
            .map(|s| s.account_id.clone())
            .collect())
    }

    async fn replier_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .statuses
            .iter()
            .filter(|s| s.in_reply_to_id.as_deref() == Some(status_id))
            .filter(|s| matches_deleted_at(s, deleted_at))
            .map(|s| s.account_id.clone())
            .collect())
    }

    async fn favouriter_ids(&self, status_id: &str) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .favourites
            .iter()
            .filter(|(_, s)| s == status_id)
            .map(|(a, _)| a.clone())
            .collect())
    }

    async fn touch_status(&self, status_id: &str) -> AppResult<()> {
        let mut data = self.data.write().await;
        if let Some(status) = data.statuses.iter_mut().find(|s| s.id == status_id) {
            // Guarantee a new version even within the same millisecond
            let now: DateTimeWithTimeZone = Utc::now().into();
            status.updated_at = now.max(status.updated_at + chrono::Duration::milliseconds(1));
        }
        Ok(())
    }

    async fn find_application(&self, id: &str) -> AppResult<Option<application::Model>> {
        let data = self.data.read().await;
        Ok(data.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_poll(&self, id: &str) -> AppResult<Option<poll::Model>> {
        let data = self.data.read().await;
        Ok(data.polls.iter().find(|p| p.id == id).cloned())
    }

    async fn has_favourited(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.favourites,
            account_id,
            status_id,
        ))
    }

    async fn has_reblogged(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data.statuses.iter().any(|s| {
            s.account_id == account_id
                && s.reblog_of_id.as_deref() == Some(status_id)
                && !s.is_deleted()
        }))
    }

    async fn has_bookmarked(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.bookmarks,
            account_id,
            status_id,
        ))
    }

    async fn has_pinned(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Ok(has_pair(&self.data.read().await.pins, account_id, status_id))
    }

    async fn has_muted_conversation(
        &self,
        account_id: &str,
        conversation_id: &str,
    ) -> AppResult<bool> {
        Ok(has_pair(
            &self.data.read().await.conversation_mutes,
            account_id,
            conversation_id,
        ))
    }

    async fn own_poll_choices(&self, poll_id: &str, account_id: &str) -> AppResult<Vec<i32>> {
        let data = self.data.read().await;
        Ok(data
            .poll_votes
            .iter()
            .filter(|v| v.poll_id == poll_id && v.account_id == account_id)
            .map(|v| v.choice)
            .collect())
    }

    async fn active_filters(&self, account_id: &str) -> AppResult<Vec<FilterWithRules>> {
        let now = Utc::now();
        let data = self.data.read().await;
        Ok(data
            .filters
            .iter()
            .filter(|f| f.filter.account_id == account_id)
            .filter(|f| f.filter.expires_at.is_none_or(|at| at > now))
            .cloned()
            .collect())
    }

    async fn find_reaction(
        &self,
        account_id: &str,
        status_id: &str,
        name: &str,
    ) -> AppResult<Option<emoji_reaction::Model>> {
        let data = self.data.read().await;
        Ok(data
            .reactions
            .iter()
            .find(|r| r.account_id == account_id && r.status_id == status_id && r.name == name)
            .cloned())
    }

    async fn status_reactions(&self, status_id: &str) -> AppResult<Vec<emoji_reaction::Model>> {
        let data = self.data.read().await;
        let mut reactions: Vec<_> = data
            .reactions
            .iter()
            .filter(|r| r.status_id == status_id)
            .cloned()
            .collect();
        reactions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reactions)
    }

    async fn reaction_exists_with_emoji(
        &self,
        status_id: &str,
        custom_emoji_id: &str,
    ) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data.reactions.iter().any(|r| {
            r.status_id == status_id && r.custom_emoji_id.as_deref() == Some(custom_emoji_id)
        }))
    }

    async fn insert_reaction(
        &self,
        reaction: emoji_reaction::Model,
    ) -> AppResult<emoji_reaction::Model> {
        let mut data = self.data.write().await;
        let duplicate = data.reactions.iter().any(|r| {
            r.account_id == reaction.account_id
                && r.status_id == reaction.status_id
                && r.name == reaction.name
        });
        if duplicate {
            return Err(AppError::DuplicateReaction(reaction.name));
        }

        data.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn account_reactions(
        &self,
        account_id: &str,
        range: &IdRange,
        limit: u64,
    ) -> AppResult<Vec<emoji_reaction::Model>> {
        let data = self.data.read().await;
        let mut reactions: Vec<_> = data
            .reactions
            .iter()
            .filter(|r| r.account_id == account_id)
            .filter(|r| range.max_id.as_ref().is_none_or(|max| r.id < *max))
            .cloned()
            .collect();

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        if let Some(min_id) = &range.min_id {
            reactions.retain(|r| r.id > *min_id);
            reactions.sort_by(|a, b| a.id.cmp(&b.id));
            reactions.truncate(limit);
            reactions.reverse();
            return Ok(reactions);
        }

        if let Some(since_id) = &range.since_id {
            reactions.retain(|r| r.id > *since_id);
        }
        reactions.sort_by(|a, b| b.id.cmp(&a.id));
        reactions.truncate(limit);
        Ok(reactions)
    }

    async fn find_custom_emoji(
        &self,
        shortcode: &str,
        domain: Option<&str>,
    ) -> AppResult<Option<custom_emoji::Model>> {
        let data = self.data.read().await;
        Ok(data
            .emojis
            .iter()
            .find(|e| e.shortcode == shortcode && e.domain.as_deref() == domain)
            .cloned())
    }

    async fn find_custom_emojis(&self, ids: &[String]) -> AppResult<Vec<custom_emoji::Model>> {
        let data = self.data.read().await;
        Ok(data
            .emojis
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn enabled_relay_inboxes(&self) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .relays
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.inbox_url.clone())
            .collect())
    }

    async fn domains_running(&self, software: &[String]) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .instance_infos
            .iter()
            .filter(|i| software.contains(&i.software))
            .map(|i| i.domain.clone())
            .collect())
    }

    async fn invalid_subscription_domains(&self) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .domain_blocks
            .iter()
            .filter(|b| b.detect_invalid_subscription)
            .map(|b| b.domain.clone())
            .collect())
    }

    async fn friend_domains(&self) -> AppResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .friend_domains
            .iter()
            .filter(|f| f.available && f.active_state == FriendState::Accepted)
            .map(|f| f.domain.clone())
            .collect())
    }

    async fn insert_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model> {
        self.data
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }
}

/// A delivery queued through [`RecordingDelivery`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedDelivery {
    Inbox {
        activity: Value,
        actor_id: String,
        inbox: String,
    },
    RawDistribution {
        activity: Value,
        source_account_id: String,
    },
}

/// [`ActivityDelivery`] that remembers every call.
#[derive(Default)]
pub struct RecordingDelivery {
    deliveries: Mutex<Vec<RecordedDelivery>>,
}

impl RecordingDelivery {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl ActivityDelivery for RecordingDelivery {
    async fn queue_delivery(&self, activity: Value, actor_id: &str, inbox: &str) -> AppResult<()> {
        self.deliveries.lock().await.push(RecordedDelivery::Inbox {
            activity,
            actor_id: actor_id.to_string(),
            inbox: inbox.to_string(),
        });
        Ok(())
    }

    async fn queue_raw_distribution(
        &self,
        activity: Value,
        source_account_id: &str,
    ) -> AppResult<()> {
        self.deliveries
            .lock()
            .await
            .push(RecordedDelivery::RawDistribution {
                activity,
                source_account_id: source_account_id.to_string(),
            });
        Ok(())
    }
}

/// [`StreamBus`] with an explicit set of live subscribers.
#[derive(Default)]
pub struct RecordingBus {
    subscribed: RwLock<HashSet<String>>,
    published: Mutex<Vec<(String, String)>>,
}

impl RecordingBus {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mark an account as holding a live subscription.
    pub async fn subscribe(&self, account_id: &str) {
        self.subscribed.write().await.insert(account_id.to_string());
    }

    /// `(channel, message)` pairs in publish order.
    pub async fn published(&self) -> Vec<(String, String)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl StreamBus for RecordingBus {
    async fn publish(&self, channel: &str, message: &str) -> AppResult<()> {
        self.published
            .lock()
            .await
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }

    async fn is_subscribed(&self, account_id: &str) -> AppResult<bool> {
        Ok(self.subscribed.read().await.contains(account_id))
    }
}
