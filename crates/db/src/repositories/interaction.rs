//! Per-viewer interaction repository (favourites, bookmarks, pins, mutes).

use std::sync::Arc;

use crate::entities::{
    Bookmark, ConversationMute, Favourite, StatusPin, bookmark, conversation_mute, favourite,
    status_pin,
};
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

/// Repository for viewer relationships to statuses.
#[derive(Clone)]
pub struct InteractionRepository {
    db: Arc<DatabaseConnection>,
}

impl InteractionRepository {
    /// Create a new interaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Accounts that favourited a status.
    pub async fn favouriter_ids(&self, status_id: &str) -> AppResult<Vec<String>> {
        Favourite::find()
            .select_only()
            .column(favourite::Column::AccountId)
            .filter(favourite::Column::StatusId.eq(status_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` favourited `status_id`.
    pub async fn has_favourited(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Favourite::find()
            .filter(favourite::Column::AccountId.eq(account_id))
            .filter(favourite::Column::StatusId.eq(status_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` bookmarked `status_id`.
    pub async fn has_bookmarked(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Bookmark::find()
            .filter(bookmark::Column::AccountId.eq(account_id))
            .filter(bookmark::Column::StatusId.eq(status_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` pinned `status_id`.
    pub async fn has_pinned(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        StatusPin::find()
            .filter(status_pin::Column::AccountId.eq(account_id))
            .filter(status_pin::Column::StatusId.eq(status_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` muted the conversation.
    pub async fn has_muted_conversation(
        &self,
        account_id: &str,
        conversation_id: &str,
    ) -> AppResult<bool> {
        ConversationMute::find()
            .filter(conversation_mute::Column::AccountId.eq(account_id))
            .filter(conversation_mute::Column::ConversationId.eq(conversation_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_has_bookmarked() {
        let mark = bookmark::Model {
            id: "b1".to_string(),
            account_id: "a1".to_string(),
            status_id: "s1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mark], vec![]])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db);
        assert!(repo.has_bookmarked("a1", "s1").await.unwrap());
        assert!(!repo.has_bookmarked("a2", "s1").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_muted_conversation() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<conversation_mute::Model>::new()])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db);
        assert!(!repo.has_muted_conversation("a1", "c1").await.unwrap());
    }
}
