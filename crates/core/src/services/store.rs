//! Storage seam.
//!
//! Every query the fan-out components run goes through [`SocialStore`], so
//! the algorithms can be exercised against an in-memory store in tests and
//! against the sea-orm repositories in production ([`RepositoryStore`]).

use std::sync::Arc;

use async_trait::async_trait;
use fanout_common::AppResult;
use fanout_db::{
    entities::{
        account, application, custom_emoji, emoji_reaction, mention, notification, poll, status,
    },
    repositories::{
        AccountRepository, CustomEmojiRepository, EmojiReactionRepository, FederationRepository,
        FilterRepository, FilterWithRules, IdRange, InteractionRepository, NotificationRepository,
        PollRepository, RelationshipRepository, StatusRepository,
    },
};
use sea_orm::{DatabaseConnection, prelude::DateTimeWithTimeZone};

/// Queryable store of accounts, statuses and their relationships.
#[async_trait]
pub trait SocialStore: Send + Sync {
    // === Accounts ===

    async fn find_account(&self, id: &str) -> AppResult<Option<account::Model>>;

    async fn find_accounts(&self, ids: &[String]) -> AppResult<Vec<account::Model>>;

    /// Accounts among `ids` whose domain is one of `domains`.
    async fn find_accounts_in_domains(
        &self,
        ids: &[String],
        domains: &[String],
    ) -> AppResult<Vec<account::Model>>;

    async fn local_account_ids(&self) -> AppResult<Vec<String>>;

    // === Relationships ===

    async fn followers(&self, account_id: &str) -> AppResult<Vec<account::Model>>;

    async fn local_follower_ids(&self, account_id: &str) -> AppResult<Vec<String>>;

    /// Followers of `account_id` except remote ones on domains that
    /// `domain_blocker_id` has blocked.
    async fn followers_outside_blocked_domains(
        &self,
        account_id: &str,
        domain_blocker_id: &str,
    ) -> AppResult<Vec<account::Model>>;

    async fn is_following(&self, account_id: &str, target_account_id: &str) -> AppResult<bool>;

    async fn is_blocking(&self, account_id: &str, target_account_id: &str) -> AppResult<bool>;

    async fn is_domain_blocking(&self, account_id: &str, domain: &str) -> AppResult<bool>;

    // === Statuses ===

    /// Non-deleted status by ID.
    async fn find_status(&self, id: &str) -> AppResult<Option<status::Model>>;

    async fn mentions(&self, status_id: &str) -> AppResult<Vec<mention::Model>>;

    /// Authors of reblogs, including those deleted at `deleted_at`.
    async fn reblogger_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>>;

    /// Authors of replies, including those deleted at `deleted_at`.
    async fn replier_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>>;

    async fn favouriter_ids(&self, status_id: &str) -> AppResult<Vec<String>>;

    /// Bump the status `updated_at`.
    async fn touch_status(&self, status_id: &str) -> AppResult<()>;

    async fn find_application(&self, id: &str) -> AppResult<Option<application::Model>>;

    async fn find_poll(&self, id: &str) -> AppResult<Option<poll::Model>>;

    // === Viewer overlay ===

    async fn has_favourited(&self, account_id: &str, status_id: &str) -> AppResult<bool>;

    async fn has_reblogged(&self, account_id: &str, status_id: &str) -> AppResult<bool>;

    async fn has_bookmarked(&self, account_id: &str, status_id: &str) -> AppResult<bool>;

    async fn has_pinned(&self, account_id: &str, status_id: &str) -> AppResult<bool>;

    async fn has_muted_conversation(
        &self,
        account_id: &str,
        conversation_id: &str,
    ) -> AppResult<bool>;

    async fn own_poll_choices(&self, poll_id: &str, account_id: &str) -> AppResult<Vec<i32>>;

    async fn active_filters(&self, account_id: &str) -> AppResult<Vec<FilterWithRules>>;

    // === Reactions ===

    async fn find_reaction(
        &self,
        account_id: &str,
        status_id: &str,
        name: &str,
    ) -> AppResult<Option<emoji_reaction::Model>>;

    /// Reactions on a status, oldest first.
    async fn status_reactions(&self, status_id: &str) -> AppResult<Vec<emoji_reaction::Model>>;

    async fn reaction_exists_with_emoji(
        &self,
        status_id: &str,
        custom_emoji_id: &str,
    ) -> AppResult<bool>;

    /// Insert a reaction. Fails with `DuplicateReaction` when the
    /// `(account, status, name)` triple already exists.
    async fn insert_reaction(
        &self,
        reaction: emoji_reaction::Model,
    ) -> AppResult<emoji_reaction::Model>;

    /// Reactions of an account, newest first.
    async fn account_reactions(
        &self,
        account_id: &str,
        range: &IdRange,
        limit: u64,
    ) -> AppResult<Vec<emoji_reaction::Model>>;

    // === Emoji ===

    async fn find_custom_emoji(
        &self,
        shortcode: &str,
        domain: Option<&str>,
    ) -> AppResult<Option<custom_emoji::Model>>;

    async fn find_custom_emojis(&self, ids: &[String]) -> AppResult<Vec<custom_emoji::Model>>;

    // === Federation ===

    async fn enabled_relay_inboxes(&self) -> AppResult<Vec<String>>;

    async fn domains_running(&self, software: &[String]) -> AppResult<Vec<String>>;

    async fn invalid_subscription_domains(&self) -> AppResult<Vec<String>>;

    async fn friend_domains(&self) -> AppResult<Vec<String>>;

    // === Notifications ===

    async fn insert_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model>;
}

/// Shared store handle.
pub type StoreService = Arc<dyn SocialStore>;

/// [`SocialStore`] backed by the sea-orm repositories.
#[derive(Clone)]
pub struct RepositoryStore {
    accounts: AccountRepository,
    relationships: RelationshipRepository,
    statuses: StatusRepository,
    interactions: InteractionRepository,
    polls: PollRepository,
    filters: FilterRepository,
    reactions: EmojiReactionRepository,
    emojis: CustomEmojiRepository,
    federation: FederationRepository,
    notifications: NotificationRepository,
}

impl RepositoryStore {
    /// Create a store over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            relationships: RelationshipRepository::new(db.clone()),
            statuses: StatusRepository::new(db.clone()),
            interactions: InteractionRepository::new(db.clone()),
            polls: PollRepository::new(db.clone()),
            filters: FilterRepository::new(db.clone()),
            reactions: EmojiReactionRepository::new(db.clone()),
            emojis: CustomEmojiRepository::new(db.clone()),
            federation: FederationRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
        }
    }
}

#[async_trait]
impl SocialStore for RepositoryStore {
    async fn find_account(&self, id: &str) -> AppResult<Option<account::Model>> {
        self.accounts.find_by_id(id).await
    }

    async fn find_accounts(&self, ids: &[String]) -> AppResult<Vec<account::Model>> {
        self.accounts.find_by_ids(ids).await
    }

    async fn find_accounts_in_domains(
        &self,
        ids: &[String],
        domains: &[String],
    ) -> AppResult<Vec<account::Model>> {
        self.accounts.find_by_ids_in_domains(ids, domains).await
    }

    async fn local_account_ids(&self) -> AppResult<Vec<String>> {
        self.accounts.local_ids().await
    }

    async fn followers(&self, account_id: &str) -> AppResult<Vec<account::Model>> {
        self.relationships.followers(account_id).await
    }

    async fn local_follower_ids(&self, account_id: &str) -> AppResult<Vec<String>> {
        self.relationships.local_follower_ids(account_id).await
    }

    async fn followers_outside_blocked_domains(
        &self,
        account_id: &str,
        domain_blocker_id: &str,
    ) -> AppResult<Vec<account::Model>> {
        self.relationships
            .followers_outside_blocked_domains(account_id, domain_blocker_id)
            .await
    }

    async fn is_following(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        self.relationships
            .is_following(account_id, target_account_id)
            .await
    }

    async fn is_blocking(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        self.relationships
            .is_blocking(account_id, target_account_id)
            .await
    }

    async fn is_domain_blocking(&self, account_id: &str, domain: &str) -> AppResult<bool> {
        self.relationships
            .is_domain_blocking(account_id, domain)
            .await
    }

    async fn find_status(&self, id: &str) -> AppResult<Option<status::Model>> {
        self.statuses.find_by_id(id).await
    }

    async fn mentions(&self, status_id: &str) -> AppResult<Vec<mention::Model>> {
        self.statuses.mentions(status_id).await
    }

    async fn reblogger_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        self.statuses.reblogger_ids(status_id, deleted_at).await
    }

    async fn replier_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        self.statuses.replier_ids(status_id, deleted_at).await
    }

    async fn favouriter_ids(&self, status_id: &str) -> AppResult<Vec<String>> {
        self.interactions.favouriter_ids(status_id).await
    }

    async fn touch_status(&self, status_id: &str) -> AppResult<()> {
        self.statuses.touch(status_id).await
    }

    async fn find_application(&self, id: &str) -> AppResult<Option<application::Model>> {
        self.statuses.find_application(id).await
    }

    async fn find_poll(&self, id: &str) -> AppResult<Option<poll::Model>> {
        self.polls.find_by_id(id).await
    }

    async fn has_favourited(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        self.interactions.has_favourited(account_id, status_id).await
    }

    async fn has_reblogged(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        self.statuses.has_reblogged(account_id, status_id).await
    }

    async fn has_bookmarked(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        self.interactions.has_bookmarked(account_id, status_id).await
    }

    async fn has_pinned(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        self.interactions.has_pinned(account_id, status_id).await
    }

    async fn has_muted_conversation(
        &self,
        account_id: &str,
        conversation_id: &str,
    ) -> AppResult<bool> {
        self.interactions
            .has_muted_conversation(account_id, conversation_id)
            .await
    }

    async fn own_poll_choices(&self, poll_id: &str, account_id: &str) -> AppResult<Vec<i32>> {
        self.polls.own_choices(poll_id, account_id).await
    }

    async fn active_filters(&self, account_id: &str) -> AppResult<Vec<FilterWithRules>> {
        self.filters.find_active_by_account(account_id).await
    }

    async fn find_reaction(
        &self,
        account_id: &str,
        status_id: &str,
        name: &str,
    ) -> AppResult<Option<emoji_reaction::Model>> {
        self.reactions
            .find_by_account_status_name(account_id, status_id, name)
            .await
    }

    async fn status_reactions(&self, status_id: &str) -> AppResult<Vec<emoji_reaction::Model>> {
        self.reactions.find_by_status(status_id).await
    }

    async fn reaction_exists_with_emoji(
        &self,
        status_id: &str,
        custom_emoji_id: &str,
    ) -> AppResult<bool> {
        self.reactions
            .exists_with_custom_emoji(status_id, custom_emoji_id)
            .await
    }

    async fn insert_reaction(
        &self,
        reaction: emoji_reaction::Model,
    ) -> AppResult<emoji_reaction::Model> {
        self.reactions.create(reaction).await
    }

    async fn account_reactions(
        &self,
        account_id: &str,
        range: &IdRange,
        limit: u64,
    ) -> AppResult<Vec<emoji_reaction::Model>> {
        self.reactions
            .find_by_account(account_id, range, limit)
            .await
    }

    async fn find_custom_emoji(
        &self,
        shortcode: &str,
        domain: Option<&str>,
    ) -> AppResult<Option<custom_emoji::Model>> {
        self.emojis.find_by_shortcode(shortcode, domain).await
    }

    async fn find_custom_emojis(&self, ids: &[String]) -> AppResult<Vec<custom_emoji::Model>> {
        self.emojis.find_by_ids(ids).await
    }

    async fn enabled_relay_inboxes(&self) -> AppResult<Vec<String>> {
        self.federation.enabled_relay_inboxes().await
    }

    async fn domains_running(&self, software: &[String]) -> AppResult<Vec<String>> {
        self.federation.domains_running(software).await
    }

    async fn invalid_subscription_domains(&self) -> AppResult<Vec<String>> {
        self.federation.invalid_subscription_domains().await
    }

    async fn friend_domains(&self) -> AppResult<Vec<String>> {
        self.federation.friend_domains().await
    }

    async fn insert_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model> {
        self.notifications.create(notification).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fanout_db::test_utils::account_fixture;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_repository_store_delegates_to_repositories() {
        let account = account_fixture("a1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account.clone()]])
                .into_connection(),
        );

        let store: StoreService = Arc::new(RepositoryStore::new(db));
        assert_eq!(store.find_account("a1").await.unwrap(), Some(account));
    }
}
