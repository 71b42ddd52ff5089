//! Emoji reaction repository.

use std::sync::Arc;

use crate::entities::{EmojiReaction, emoji_reaction};
use fanout_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

/// Bounds of an id-paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRange {
    /// Only ids lower than this.
    pub max_id: Option<String>,
    /// Only ids greater than this, newest first.
    pub since_id: Option<String>,
    /// Only ids greater than this, starting right after it.
    pub min_id: Option<String>,
}

/// Emoji reaction repository for database operations.
#[derive(Clone)]
pub struct EmojiReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl EmojiReactionRepository {
    /// Create a new emoji reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by account, status and emoji name.
    pub async fn find_by_account_status_name(
        &self,
        account_id: &str,
        status_id: &str,
        name: &str,
    ) -> AppResult<Option<emoji_reaction::Model>> {
        EmojiReaction::find()
            .filter(emoji_reaction::Column::AccountId.eq(account_id))
            .filter(emoji_reaction::Column::StatusId.eq(status_id))
            .filter(emoji_reaction::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All reactions on a status, oldest first.
    pub async fn find_by_status(&self, status_id: &str) -> AppResult<Vec<emoji_reaction::Model>> {
        EmojiReaction::find()
            .filter(emoji_reaction::Column::StatusId.eq(status_id))
            .order_by_asc(emoji_reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a status already carries a reaction with this custom emoji.
    pub async fn exists_with_custom_emoji(
        &self,
        status_id: &str,
        custom_emoji_id: &str,
    ) -> AppResult<bool> {
        EmojiReaction::find()
            .filter(emoji_reaction::Column::StatusId.eq(status_id))
            .filter(emoji_reaction::Column::CustomEmojiId.eq(custom_emoji_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a reaction.
    ///
    /// A unique violation on `(account_id, status_id, name)` is reported as
    /// [`AppError::DuplicateReaction`].
    pub async fn create(&self, model: emoji_reaction::Model) -> AppResult<emoji_reaction::Model> {
        let name = model.name.clone();
        model
            .into_active_model()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_insert_error(&e, &name))
    }

    /// Reactions of an account, id-paginated, newest first.
    pub async fn find_by_account(
        &self,
        account_id: &str,
        range: &IdRange,
        limit: u64,
    ) -> AppResult<Vec<emoji_reaction::Model>> {
        let mut query =
            EmojiReaction::find().filter(emoji_reaction::Column::AccountId.eq(account_id));

        if let Some(max_id) = &range.max_id {
            query = query.filter(emoji_reaction::Column::Id.lt(max_id.as_str()));
        }

        if let Some(min_id) = &range.min_id {
            // Oldest page after min_id, returned newest first
            let mut page = query
                .filter(emoji_reaction::Column::Id.gt(min_id.as_str()))
                .order_by_asc(emoji_reaction::Column::Id)
                .limit(limit)
                .all(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            page.reverse();
            return Ok(page);
        }

        if let Some(since_id) = &range.since_id {
            query = query.filter(emoji_reaction::Column::Id.gt(since_id.as_str()));
        }

        query
            .order_by_desc(emoji_reaction::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn map_insert_error(err: &DbErr, name: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateReaction(name.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
