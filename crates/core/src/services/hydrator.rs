//! Per-viewer hydration of shared status payloads.
//!
//! Only the viewer-agnostic base payload is cached. Everything written here
//! is computed for one viewer and returned, never stored.

use fanout_common::{AppError, AppResult};
use fanout_db::entities::status;

use crate::services::{
    filter::apply_filters,
    reaction_group::ReactionGroups,
    render::{StatusPayload, StatusRenderer},
    store::StoreService,
};

/// Overlays viewer relationship state onto cached payloads.
#[derive(Clone)]
pub struct CacheHydrator {
    store: StoreService,
    renderer: StatusRenderer,
}

impl CacheHydrator {
    #[must_use]
    pub const fn new(store: StoreService, renderer: StatusRenderer) -> Self {
        Self { store, renderer }
    }

    /// Payload of `status` as seen by `viewer_id`.
    pub async fn hydrate(&self, status: &status::Model, viewer_id: &str) -> AppResult<StatusPayload> {
        if self.store.find_account(viewer_id).await?.is_none() {
            return Err(AppError::AccountNotFound(viewer_id.to_string()));
        }

        let cached = self.renderer.fetch(status).await?;
        let mut payload = cached.payload.clone();

        // Authors see their own client even when they hide it publicly
        if payload.application.is_none() && status.account_id == viewer_id {
            payload.application = self.renderer.application(status).await?;
        }

        let Some(original_id) = &status.reblog_of_id else {
            self.overlay(&mut payload, status, viewer_id).await?;
            return Ok(payload);
        };

        let original = self
            .store
            .find_status(original_id)
            .await?
            .ok_or_else(|| AppError::StatusNotFound(original_id.clone()))?;

        // These relationships only ever attach to the original
        payload.muted = Some(false);
        payload.bookmarked = Some(false);
        if status.account_id == viewer_id {
            payload.pinned = Some(false);
        }

        let reblog = payload
            .reblog
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal(format!("Payload of reblog {} has no original", status.id)))?;

        if reblog.application.is_none() && original.account_id == viewer_id {
            reblog.application = self.renderer.application(&original).await?;
        }

        self.overlay(reblog, &original, viewer_id).await?;

        let (favourited, reblogged, filtered) =
            (reblog.favourited, reblog.reblogged, reblog.filtered.clone());
        payload.favourited = favourited;
        payload.reblogged = reblogged;
        payload.filtered = filtered;

        Ok(payload)
    }

    /// Relationship fields of `status` for the viewer.
    async fn overlay(
        &self,
        payload: &mut StatusPayload,
        status: &status::Model,
        viewer_id: &str,
    ) -> AppResult<()> {
        let store = self.store.as_ref();
        let is_author = status.account_id == viewer_id;

        payload.favourited = Some(store.has_favourited(viewer_id, &status.id).await?);
        payload.reblogged = Some(store.has_reblogged(viewer_id, &status.id).await?);
        payload.muted = Some(match &status.conversation_id {
            Some(conversation_id) => store.has_muted_conversation(viewer_id, conversation_id).await?,
            None => false,
        });
        payload.bookmarked = Some(store.has_bookmarked(viewer_id, &status.id).await?);
        if is_author {
            payload.pinned = Some(store.has_pinned(viewer_id, &status.id).await?);
        }

        let poll = match &status.poll_id {
            Some(poll_id) => store.find_poll(poll_id).await?,
            None => None,
        };

        let filters = store.active_filters(viewer_id).await?;
        payload.filtered = Some(apply_filters(&filters, status, poll.as_ref())?);

        payload.emoji_reactions = ReactionGroups::load(store, &status.id, Some(viewer_id))
            .await?
            .into_vec();

        if let (Some(poll_payload), Some(poll)) = (payload.poll.as_mut(), poll.as_ref()) {
            if is_author {
                poll_payload.voted = Some(true);
                poll_payload.own_votes = Some(Vec::new());
            } else {
                let choices = store.own_poll_choices(&poll.id, viewer_id).await?;
                poll_payload.voted = Some(!choices.is_empty());
                poll_payload.own_votes = Some(choices);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        services::payload_cache::{MemoryPayloadCache, PayloadCache},
        services::store::SocialStore,
        testing::{MemoryData, MemoryStore},
    };
    use chrono::Utc;
    use fanout_db::{
        entities::{account, application, poll, poll_vote, status::Visibility},
        test_utils::{account_fixture, reaction_fixture, status_fixture},
    };
    use fanout_federation::UrlConfig;
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        cache: Arc<MemoryPayloadCache>,
        hydrator: CacheHydrator,
        renderer: StatusRenderer,
    }

    fn fixture(data: MemoryData) -> Fixture {
        let store = Arc::new(MemoryStore::new(data));
        let cache = Arc::new(MemoryPayloadCache::new());
        let renderer = StatusRenderer::new(
            store.clone(),
            cache.clone(),
            UrlConfig::parse("https://local.example").unwrap(),
        );
        Fixture {
            hydrator: CacheHydrator::new(store.clone(), renderer.clone()),
            store,
            cache,
            renderer,
        }
    }

    fn pair(left: &str, right: &str) -> (String, String) {
        (left.to_string(), right.to_string())
    }

    fn base_data() -> MemoryData {
        MemoryData {
            accounts: vec![
                account_fixture("author", None),
                account_fixture("viewer", None),
                account_fixture("other", None),
            ],
            statuses: vec![status_fixture("s", "author", Visibility::Public)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_viewers_get_their_own_relationships() {
        let mut data = base_data();
        data.favourites.push(pair("viewer", "s"));
        data.pins.push(pair("author", "s"));
        data.reactions.push(reaction_fixture("r1", "viewer", "s", "👍"));
        let f = fixture(data);
        let status = f.store.find_status("s").await.unwrap().unwrap();

        let for_viewer = f.hydrator.hydrate(&status, "viewer").await.unwrap();
        assert_eq!(for_viewer.favourited, Some(true));
        assert_eq!(for_viewer.pinned, None);
        assert!(for_viewer.emoji_reactions[0].me);

        let for_author = f.hydrator.hydrate(&status, "author").await.unwrap();
        assert_eq!(for_author.favourited, Some(false));
        assert_eq!(for_author.pinned, Some(true));
        assert!(!for_author.emoji_reactions[0].me);

        // The shared entry stays viewer-agnostic
        let cached = f.cache.get("s").await.unwrap().unwrap();
        assert_eq!(cached.payload.favourited, None);
        assert_eq!(cached.payload.pinned, None);
        assert!(!cached.payload.emoji_reactions[0].me);
    }

    #[tokio::test]
    async fn test_reblog_wrapper_forces_original_only_fields() {
        let mut data = base_data();
        data.statuses.push(status::Model {
            reblog_of_id: Some("s".to_string()),
            ..status_fixture("wrapper", "viewer", Visibility::Public)
        });
        data.bookmarks.push(pair("viewer", "s"));
        data.favourites.push(pair("viewer", "s"));
        let f = fixture(data);
        let wrapper = f.store.find_status("wrapper").await.unwrap().unwrap();

        let payload = f.hydrator.hydrate(&wrapper, "viewer").await.unwrap();
        assert_eq!(payload.muted, Some(false));
        assert_eq!(payload.bookmarked, Some(false));
        assert_eq!(payload.pinned, Some(false));
        assert_eq!(payload.favourited, Some(true));
        assert_eq!(payload.reblogged, Some(true));

        let original = payload.reblog.unwrap();
        assert_eq!(original.bookmarked, Some(true));
        assert_eq!(original.favourited, Some(true));

        let for_other = f.hydrator.hydrate(&wrapper, "other").await.unwrap();
        assert_eq!(for_other.pinned, None);
        assert_eq!(for_other.bookmarked, Some(false));
        assert_eq!(for_other.favourited, Some(false));
    }

    #[tokio::test]
    async fn test_hidden_application_only_for_author() {
        let mut data = base_data();
        data.accounts[0] = account::Model {
            show_application: false,
            ..account_fixture("author", None)
        };
        data.statuses[0].application_id = Some("app".to_string());
        data.applications.push(application::Model {
            id: "app".to_string(),
            name: "Fanout Web".to_string(),
            website: None,
            created_at: Utc::now().into(),
        });
        let f = fixture(data);
        let status = f.store.find_status("s").await.unwrap().unwrap();

        let for_author = f.hydrator.hydrate(&status, "author").await.unwrap();
        assert_eq!(for_author.application.unwrap().name, "Fanout Web");

        let for_viewer = f.hydrator.hydrate(&status, "viewer").await.unwrap();
        assert!(for_viewer.application.is_none());
    }

    #[tokio::test]
    async fn test_poll_vote_state() {
        let mut data = base_data();
        data.statuses[0].poll_id = Some("p".to_string());
        data.polls.push(poll::Model {
            id: "p".to_string(),
            status_id: "s".to_string(),
            account_id: "author".to_string(),
            options: json!(["yes", "no"]),
            cached_tallies: json!([0, 1]),
            multiple: false,
            votes_count: 1,
            voters_count: Some(1),
            expires_at: None,
            created_at: Utc::now().into(),
        });
        data.poll_votes.push(poll_vote::Model {
            id: "v".to_string(),
            poll_id: "p".to_string(),
            account_id: "viewer".to_string(),
            choice: 1,
            created_at: Utc::now().into(),
        });
        let f = fixture(data);
        let status = f.store.find_status("s").await.unwrap().unwrap();

        let author_poll = f.hydrator.hydrate(&status, "author").await.unwrap().poll.unwrap();
        assert_eq!(author_poll.voted, Some(true));
        assert_eq!(author_poll.own_votes, Some(vec![]));

        let viewer_poll = f.hydrator.hydrate(&status, "viewer").await.unwrap().poll.unwrap();
        assert_eq!(viewer_poll.voted, Some(true));
        assert_eq!(viewer_poll.own_votes, Some(vec![1]));
        assert_eq!(viewer_poll.options[1].votes_count, 1);

        let other_poll = f.hydrator.hydrate(&status, "other").await.unwrap().poll.unwrap();
        assert_eq!(other_poll.voted, Some(false));
    }

    #[tokio::test]
    async fn test_unknown_viewer() {
        let f = fixture(base_data());
        let status = f.store.find_status("s").await.unwrap().unwrap();

        let result = f.hydrator.hydrate(&status, "ghost").await;
        assert!(matches!(result, Err(AppError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_cached_payload_is_replaced_on_new_version() {
        let f = fixture(base_data());
        let status = f.store.find_status("s").await.unwrap().unwrap();

        let first = f.renderer.fetch(&status).await.unwrap();
        assert!(first.payload.emoji_reactions.is_empty());

        f.store
            .update(|d| d.reactions.push(reaction_fixture("r1", "viewer", "s", "👍")))
            .await;

        // Same version: served from cache
        let cached = f.renderer.fetch(&status).await.unwrap();
        assert!(cached.payload.emoji_reactions.is_empty());

        f.store.touch_status("s").await.unwrap();
        let touched = f.store.find_status("s").await.unwrap().unwrap();

        let second = f.renderer.fetch(&touched).await.unwrap();
        assert!(second.version > first.version);
        assert_eq!(second.payload.emoji_reactions.len(), 1);
        // Readers of the old entry keep a consistent value
        assert!(first.payload.emoji_reactions.is_empty());
    }
}
