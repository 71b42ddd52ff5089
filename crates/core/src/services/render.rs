//! Viewer-agnostic status rendering.
//!
//! [`StatusRenderer::render`] never looks at who is asking: relationship
//! fields stay `None` and poll vote state is left unset. The hydrator fills
//! them in per viewer.

use std::sync::Arc;

use fanout_common::{AppError, AppResult};
use fanout_db::entities::{
    account, application, poll,
    status::{self, Visibility},
};
use fanout_federation::UrlConfig;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::{
    filter::FilterResultPayload,
    payload_cache::{CachedPayload, PayloadCacheService},
    reaction_group::{ReactionGroup, ReactionGroups},
    store::StoreService,
};

/// Author summary embedded in a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub id: String,
    pub username: String,
    pub acct: String,
    pub url: Option<String>,
}

/// Client application a status was posted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPayload {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOptionPayload {
    pub title: String,
    pub votes_count: i64,
}

/// Poll attached to a status. `voted`/`own_votes` are viewer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPayload {
    pub id: String,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub multiple: bool,
    pub votes_count: i32,
    pub voters_count: Option<i32>,
    pub options: Vec<PollOptionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub own_votes: Option<Vec<i32>>,
}

/// Rendered status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub id: String,
    pub created_at: DateTimeWithTimeZone,
    pub edited_at: Option<DateTimeWithTimeZone>,
    pub in_reply_to_id: Option<String>,
    pub in_reply_to_account_id: Option<String>,
    pub visibility: Visibility,
    pub local_only: bool,
    pub spoiler_text: String,
    pub content: String,
    pub uri: String,
    pub url: Option<String>,
    pub account: AccountPayload,
    pub reblog: Option<Box<StatusPayload>>,
    pub application: Option<ApplicationPayload>,
    pub poll: Option<PollPayload>,
    pub emoji_reactions: Vec<ReactionGroup>,

    // Viewer overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favourited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reblogged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Vec<FilterResultPayload>>,
}

impl From<&account::Model> for AccountPayload {
    fn from(account: &account::Model) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            acct: account.acct(),
            url: account.url.clone(),
        }
    }
}

impl From<&application::Model> for ApplicationPayload {
    fn from(app: &application::Model) -> Self {
        Self {
            name: app.name.clone(),
            website: app.website.clone(),
        }
    }
}

impl From<&poll::Model> for PollPayload {
    fn from(poll: &poll::Model) -> Self {
        let options = poll
            .option_titles()
            .into_iter()
            .zip(poll.tallies())
            .map(|(title, votes_count)| PollOptionPayload { title, votes_count })
            .collect();

        Self {
            id: poll.id.clone(),
            expires_at: poll.expires_at,
            multiple: poll.multiple,
            votes_count: poll.votes_count,
            voters_count: poll.voters_count,
            options,
            voted: None,
            own_votes: None,
        }
    }
}

/// Version of the rendering of `status`: the latest `updated_at` of the
/// status and the original it wraps.
#[must_use]
pub fn payload_version(status: &status::Model, original: Option<&status::Model>) -> i64 {
    original.map_or(status.version(), |o| status.version().max(o.version()))
}

/// Renders statuses and keeps the shared payload cache current.
#[derive(Clone)]
pub struct StatusRenderer {
    store: StoreService,
    cache: PayloadCacheService,
    urls: UrlConfig,
}

impl StatusRenderer {
    #[must_use]
    pub const fn new(store: StoreService, cache: PayloadCacheService, urls: UrlConfig) -> Self {
        Self { store, cache, urls }
    }

    /// Shared payload for `status`, rendering it when the cached entry is
    /// missing or was rendered from another version.
    pub async fn fetch(&self, status: &status::Model) -> AppResult<Arc<CachedPayload>> {
        let original = self.original_of(status).await?;
        let version = payload_version(status, original.as_ref());

        if let Some(cached) = self.cache.get(&status.id).await? {
            if cached.version == version {
                return Ok(cached);
            }
            debug!(status_id = %status.id, cached = cached.version, version, "Stale payload");
        }

        let payload = self.render_with(status, original.as_ref()).await?;
        let entry = CachedPayload { version, payload };
        self.cache.put(&status.id, entry.clone()).await?;

        Ok(Arc::new(entry))
    }

    /// Render without consulting the cache.
    pub async fn render(&self, status: &status::Model) -> AppResult<StatusPayload> {
        let original = self.original_of(status).await?;
        self.render_with(status, original.as_ref()).await
    }

    /// Application of a status, regardless of whether its author shows it.
    pub async fn application(&self, status: &status::Model) -> AppResult<Option<ApplicationPayload>> {
        let Some(application_id) = &status.application_id else {
            return Ok(None);
        };

        Ok(self
            .store
            .find_application(application_id)
            .await?
            .as_ref()
            .map(ApplicationPayload::from))
    }

    async fn original_of(&self, status: &status::Model) -> AppResult<Option<status::Model>> {
        let Some(original_id) = &status.reblog_of_id else {
            return Ok(None);
        };

        self.store
            .find_status(original_id)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::StatusNotFound(original_id.clone()))
    }

    async fn render_with(
        &self,
        status: &status::Model,
        original: Option<&status::Model>,
    ) -> AppResult<StatusPayload> {
        let mut payload = self.render_single(status).await?;
        if let Some(original) = original {
            payload.reblog = Some(Box::new(self.render_single(original).await?));
        }
        Ok(payload)
    }

    async fn render_single(&self, status: &status::Model) -> AppResult<StatusPayload> {
        let author = self
            .store
            .find_account(&status.account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(status.account_id.clone()))?;

        let application = if author.show_application {
            self.application(status).await?
        } else {
            None
        };

        let poll = match &status.poll_id {
            Some(poll_id) => self
                .store
                .find_poll(poll_id)
                .await?
                .as_ref()
                .map(PollPayload::from),
            None => None,
        };

        let emoji_reactions = ReactionGroups::load(self.store.as_ref(), &status.id, None)
            .await?
            .into_vec();

        Ok(StatusPayload {
            id: status.id.clone(),
            created_at: status.created_at,
            edited_at: status.edited_at,
            in_reply_to_id: status.in_reply_to_id.clone(),
            in_reply_to_account_id: status.in_reply_to_account_id.clone(),
            visibility: status.visibility,
            local_only: status.local_only,
            spoiler_text: status.spoiler_text.clone(),
            content: status.text.clone(),
            uri: self.urls.status_uri(status, &author)?.to_string(),
            url: status.url.clone(),
            account: AccountPayload::from(&author),
            reblog: None,
            application,
            poll,
            emoji_reactions,
            favourited: None,
            reblogged: None,
            muted: None,
            bookmarked: None,
            pinned: None,
            filtered: None,
        })
    }
}
