//! Remote audience of a status.
//!
//! [`ReachResolver::inboxes`] computes every inbox an activity about a status
//! must be delivered to. [`ReachResolver::inboxes_for_incompatible_software`]
//! computes the reduced set for peers known to treat unlisted statuses as
//! public.

use std::collections::HashSet;

use fanout_common::AppResult;
use fanout_db::entities::{
    account,
    status::{self, Searchability, Visibility},
};
use tracing::debug;

use crate::services::store::StoreService;

/// Options for [`ReachResolver::inboxes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachOptions {
    /// Also reach accounts that interacted with a non-distributable status,
    /// so retractions reach them too.
    pub unsafe_mode: bool,
}

/// Resolves destination inboxes for activities about a status.
#[derive(Clone)]
pub struct ReachResolver {
    store: StoreService,
    incompatible_software: Vec<String>,
}

impl ReachResolver {
    /// `incompatible_software` lists software names that mishandle unlisted
    /// and limited visibility.
    #[must_use]
    pub const fn new(store: StoreService, incompatible_software: Vec<String>) -> Self {
        Self {
            store,
            incompatible_software,
        }
    }

    /// Deduplicated inbox URLs, in discovery order.
    pub async fn inboxes(
        &self,
        status: &status::Model,
        options: ReachOptions,
    ) -> AppResult<Vec<String>> {
        if status.local_only {
            return Ok(Vec::new());
        }

        let reached_ids = self.reached_account_ids(status, options).await?;
        let reached = self.store.find_accounts(&reached_ids).await?;
        let followers = self.follower_accounts(status).await?;

        let mut inboxes = inboxes_of(&reached);
        inboxes.extend(inboxes_of(&followers));

        if status.visibility == Visibility::Public {
            inboxes.extend(self.store.enabled_relay_inboxes().await?);
        }

        let inboxes = dedup(inboxes);
        debug!(status_id = %status.id, inbox_count = inboxes.len(), "Resolved inboxes");
        Ok(inboxes)
    }

    /// Inboxes on incompatible-software domains that must still receive an
    /// unlisted or limited status.
    ///
    /// Empty unless the status is unlisted and at least one such domain
    /// exists.
    pub async fn inboxes_for_incompatible_software(
        &self,
        status: &status::Model,
    ) -> AppResult<Vec<String>> {
        if status.local_only {
            return Ok(Vec::new());
        }

        let banned = self.banned_domains(status).await?;
        if banned.is_empty() {
            return Ok(Vec::new());
        }

        let friends = self.store.friend_domains().await?;
        let targets: Vec<String> = banned
            .iter()
            .filter(|d| !friends.contains(d))
            .cloned()
            .collect();

        let reached = if status.is_reblog() {
            Vec::new()
        } else if status.visibility == Visibility::Limited {
            let mentioned = self.mentioned_account_ids(status).await?;
            self.store
                .find_accounts_in_domains(&mentioned, &banned)
                .await?
        } else {
            let reached_ids = self
                .reached_account_ids(status, ReachOptions::default())
                .await?;
            self.store
                .find_accounts_in_domains(&reached_ids, &targets)
                .await?
        };

        let followers: Vec<account::Model> = self
            .follower_accounts(status)
            .await?
            .into_iter()
            .filter(|a| a.domain.as_ref().is_some_and(|d| targets.contains(d)))
            .collect();

        let mut inboxes = inboxes_of(&reached);
        inboxes.extend(inboxes_of(&followers));
        Ok(dedup(inboxes))
    }

    /// Accounts that interacted with the status directly.
    async fn reached_account_ids(
        &self,
        status: &status::Model,
        options: ReachOptions,
    ) -> AppResult<Vec<String>> {
        // Interactions with a reblog are recorded on the original
        if let Some(original_id) = &status.reblog_of_id {
            return Ok(self
                .store
                .find_status(original_id)
                .await?
                .map(|original| vec![original.account_id])
                .unwrap_or_default());
        }

        let distributable = status.visibility.is_distributable();
        let mut ids = Vec::new();

        if distributable {
            ids.extend(status.in_reply_to_account_id.clone());
        }

        ids.extend(self.mentioned_account_ids(status).await?);

        if distributable || options.unsafe_mode {
            ids.extend(
                self.store
                    .reblogger_ids(&status.id, status.deleted_at)
                    .await?,
            );
            ids.extend(self.store.favouriter_ids(&status.id).await?);
            ids.extend(self.store.replier_ids(&status.id, status.deleted_at).await?);
        }

        Ok(dedup(ids))
    }

    async fn mentioned_account_ids(&self, status: &status::Model) -> AppResult<Vec<String>> {
        Ok(self
            .store
            .mentions(&status.id)
            .await?
            .into_iter()
            .map(|m| m.account_id)
            .collect())
    }

    async fn follower_accounts(&self, status: &status::Model) -> AppResult<Vec<account::Model>> {
        match status.visibility {
            Visibility::Direct | Visibility::Limited => return Ok(Vec::new()),
            visibility if visibility.is_distributable() => {
                if let Some(thread_author) = self.local_reply_target(status).await? {
                    let mut followers = self.store.followers(&status.account_id).await?;
                    followers.extend(
                        self.store
                            .followers_outside_blocked_domains(
                                &thread_author.id,
                                &status.account_id,
                            )
                            .await?,
                    );
                    return Ok(followers);
                }
            }
            _ => {}
        }

        self.store.followers(&status.account_id).await
    }

    /// Author of the replied-to status, when local.
    async fn local_reply_target(
        &self,
        status: &status::Model,
    ) -> AppResult<Option<account::Model>> {
        let Some(account_id) = &status.in_reply_to_account_id else {
            return Ok(None);
        };

        Ok(self
            .store
            .find_account(account_id)
            .await?
            .filter(account::Model::is_local))
    }

    /// Incompatible-software domains an unlisted status must be trimmed for.
    async fn banned_domains(&self, status: &status::Model) -> AppResult<Vec<String>> {
        if status.visibility != Visibility::Unlisted {
            return Ok(Vec::new());
        }

        let mut domains = self.banned_domains_of(status).await?;

        if let Some(original_id) = &status.reblog_of_id {
            if let Some(original) = self.store.find_status(original_id).await? {
                if original.local {
                    domains.extend(self.banned_domains_of(&original).await?);
                }
            }
        }

        Ok(dedup(domains))
    }

    async fn banned_domains_of(&self, status: &status::Model) -> AppResult<Vec<String>> {
        if status.searchability == Searchability::Public
            || status.visibility != Visibility::Unlisted
        {
            return Ok(Vec::new());
        }

        let mut domains = self
            .store
            .domains_running(&self.incompatible_software)
            .await?;
        domains.extend(self.store.invalid_subscription_domains().await?);
        Ok(domains)
    }
}

/// Preferred inboxes of remote `ActivityPub` accounts.
fn inboxes_of(accounts: &[account::Model]) -> Vec<String> {
    accounts
        .iter()
        .filter(|a| a.is_activitypub())
        .filter_map(account::Model::preferred_inbox_url)
        .map(String::from)
        .collect()
}

/// Remove repeats, keeping first occurrences in order.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryData, MemoryStore};
    use chrono::Utc;
    use fanout_db::{
        entities::{
            friend_domain::{self, FriendState},
            instance_info, mention, relay,
        },
        test_utils::{account_fixture, status_fixture},
    };
    use std::sync::Arc;

    fn inbox(id: &str, domain: &str) -> String {
        format!("https://{domain}/users/{id}/inbox")
    }

    fn follow(follower: &str, followed: &str) -> (String, String) {
        (follower.to_string(), followed.to_string())
    }

    fn mention(status_id: &str, account_id: &str) -> mention::Model {
        mention::Model {
            id: format!("{status_id}-{account_id}"),
            status_id: status_id.to_string(),
            account_id: account_id.to_string(),
            silent: false,
        }
    }

    fn relay(id: &str, enabled: bool) -> relay::Model {
        relay::Model {
            id: id.to_string(),
            inbox_url: format!("https://{id}.relay.example/inbox"),
            enabled,
            created_at: Utc::now().into(),
        }
    }

    fn base_data() -> MemoryData {
        MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("local_fan", None),
                account_fixture("alice", Some("a.example")),
                account_fixture("bob", Some("b.example")),
                account_fixture("carol", Some("c.example")),
            ],
            follows: vec![
                follow("alice", "author"),
                follow("local_fan", "author"),
            ],
            relays: vec![relay("on", true), relay("off", false)],
            ..Default::default()
        }
    }

    fn resolver(data: MemoryData) -> ReachResolver {
        ReachResolver::new(
            Arc::new(MemoryStore::new(data)),
            vec!["misskey".to_string()],
        )
    }

    #[tokio::test]
    async fn test_relays_only_for_public() {
        let resolver = resolver(base_data());

        let public = status_fixture("s", "author", Visibility::Public);
        let inboxes = resolver.inboxes(&public, ReachOptions::default()).await.unwrap();
        assert_eq!(
            inboxes,
            vec![inbox("alice", "a.example"), "https://on.relay.example/inbox".to_string()]
        );

        let unlisted = status_fixture("s", "author", Visibility::Unlisted);
        let inboxes = resolver.inboxes(&unlisted, ReachOptions::default()).await.unwrap();
        assert_eq!(inboxes, vec![inbox("alice", "a.example")]);
    }

    #[tokio::test]
    async fn test_interactions_are_deduplicated() {
        let mut data = base_data();
        data.mentions.push(mention("s", "bob"));
        data.favourites.push(("bob".to_string(), "s".to_string()));
        data.favourites.push(("alice".to_string(), "s".to_string()));
        data.statuses.push(status::Model {
            in_reply_to_id: Some("s".to_string()),
            ..status_fixture("reply", "bob", Visibility::Public)
        });

        let status = status_fixture("s", "author", Visibility::Unlisted);
        let inboxes = resolver(data)
            .inboxes(&status, ReachOptions::default())
            .await
            .unwrap();

        assert_eq!(inboxes, vec![inbox("alice", "a.example"), inbox("bob", "b.example")]);
    }

    #[tokio::test]
    async fn test_shared_inbox_collapses_followers() {
        let mut data = base_data();
        data.accounts.push(account::Model {
            shared_inbox_url: Some("https://a.example/inbox".to_string()),
            ..account_fixture("alice2", Some("a.example"))
        });
        data.accounts[2].shared_inbox_url = Some("https://a.example/inbox".to_string());
        data.follows.push(follow("alice2", "author"));

        let status = status_fixture("s", "author", Visibility::Private);
        let inboxes = resolver(data)
            .inboxes(&status, ReachOptions::default())
            .await
            .unwrap();

        assert_eq!(inboxes, vec!["https://a.example/inbox".to_string()]);
    }

    #[tokio::test]
    async fn test_unsafe_mode_reaches_interactions_on_private_status() {
        let deleted_at = Utc::now().into();
        let mut data = base_data();
        data.favourites.push(("bob".to_string(), "s".to_string()));
        data.statuses.push(status::Model {
            reblog_of_id: Some("s".to_string()),
            deleted_at: Some(deleted_at),
            ..status_fixture("reblog", "carol", Visibility::Private)
        });

        let status = status::Model {
            deleted_at: Some(deleted_at),
            ..status_fixture("s", "author", Visibility::Private)
        };
        let resolver = resolver(data);

        let safe = resolver.inboxes(&status, ReachOptions::default()).await.unwrap();
        assert_eq!(safe, vec![inbox("alice", "a.example")]);

        let unsafe_inboxes = resolver
            .inboxes(&status, ReachOptions { unsafe_mode: true })
            .await
            .unwrap();
        assert_eq!(
            unsafe_inboxes,
            vec![
                inbox("bob", "b.example"),
                inbox("carol", "c.example"),
                inbox("alice", "a.example"),
            ]
        );
    }

    #[tokio::test]
    async fn test_reblog_reaches_only_original_author() {
        let mut data = base_data();
        data.statuses.push(status::Model {
            local: false,
            ..status_fixture("original", "bob", Visibility::Public)
        });
        data.mentions.push(mention("reblog", "carol"));
        data.favourites.push(("carol".to_string(), "reblog".to_string()));
        data.relays.clear();

        let reblog = status::Model {
            reblog_of_id: Some("original".to_string()),
            ..status_fixture("reblog", "author", Visibility::Public)
        };
        let inboxes = resolver(data)
            .inboxes(&reblog, ReachOptions::default())
            .await
            .unwrap();

        assert_eq!(inboxes, vec![inbox("bob", "b.example"), inbox("alice", "a.example")]);
    }

    #[tokio::test]
    async fn test_limited_and_direct_skip_followers() {
        let mut data = base_data();
        data.mentions.push(mention("s", "bob"));
        let resolver = resolver(data);

        for visibility in [Visibility::Limited, Visibility::Direct] {
            let status = status_fixture("s", "author", visibility);
            let inboxes = resolver.inboxes(&status, ReachOptions::default()).await.unwrap();
            assert_eq!(inboxes, vec![inbox("bob", "b.example")]);
        }
    }

    #[tokio::test]
    async fn test_reply_reaches_thread_followers_outside_blocked_domains() {
        let mut data = base_data();
        data.accounts.push(account_fixture("thread_author", None));
        data.follows.push(follow("bob", "thread_author"));
        data.follows.push(follow("carol", "thread_author"));
        data.follows.push(follow("local_fan", "thread_author"));
        data.account_domain_blocks
            .push(("author".to_string(), "c.example".to_string()));
        data.relays.clear();

        let reply = status::Model {
            in_reply_to_id: Some("root".to_string()),
            in_reply_to_account_id: Some("thread_author".to_string()),
            ..status_fixture("s", "author", Visibility::Unlisted)
        };
        let inboxes = resolver(data)
            .inboxes(&reply, ReachOptions::default())
            .await
            .unwrap();

        assert_eq!(inboxes, vec![inbox("alice", "a.example"), inbox("bob", "b.example")]);
    }

    #[tokio::test]
    async fn test_local_only_is_never_federated() {
        let status = status::Model {
            local_only: true,
            ..status_fixture("s", "author", Visibility::Public)
        };
        let resolver = resolver(base_data());

        assert!(resolver.inboxes(&status, ReachOptions::default()).await.unwrap().is_empty());
        assert!(
            resolver
                .inboxes_for_incompatible_software(&status)
                .await
                .unwrap()
                .is_empty()
        );
    }

    fn incompatible_data() -> MemoryData {
        let mut data = base_data();
        data.instance_infos.push(instance_info::Model {
            domain: "a.example".to_string(),
            software: "misskey".to_string(),
            version: None,
            updated_at: Utc::now().into(),
        });
        data.instance_infos.push(instance_info::Model {
            domain: "b.example".to_string(),
            software: "misskey".to_string(),
            version: None,
            updated_at: Utc::now().into(),
        });
        data.friend_domains.push(friend_domain::Model {
            id: "f1".to_string(),
            domain: "b.example".to_string(),
            inbox_url: None,
            active_state: FriendState::Accepted,
            passive_state: FriendState::Accepted,
            available: true,
            created_at: Utc::now().into(),
        });
        data.follows.push(follow("bob", "author"));
        data.follows.push(follow("carol", "author"));
        data
    }

    #[tokio::test]
    async fn test_incompatible_software_trims_friend_domains() {
        let status = status::Model {
            searchability: Searchability::Private,
            ..status_fixture("s", "author", Visibility::Unlisted)
        };

        let inboxes = resolver(incompatible_data())
            .inboxes_for_incompatible_software(&status)
            .await
            .unwrap();

        assert_eq!(inboxes, vec![inbox("alice", "a.example")]);
    }

    #[tokio::test]
    async fn test_incompatible_software_empty_unless_unlisted_and_unsearchable() {
        let resolver = resolver(incompatible_data());

        let searchable = status_fixture("s", "author", Visibility::Unlisted);
        assert!(
            resolver
                .inboxes_for_incompatible_software(&searchable)
                .await
                .unwrap()
                .is_empty()
        );

        let public = status::Model {
            searchability: Searchability::Private,
            ..status_fixture("s", "author", Visibility::Public)
        };
        assert!(
            resolver
                .inboxes_for_incompatible_software(&public)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
