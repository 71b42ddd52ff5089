//! Status repository.

use std::sync::Arc;

use crate::entities::{Application, Mention, Status, application, mention, status};
use fanout_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Status repository for database operations.
#[derive(Clone)]
pub struct StatusRepository {
    db: Arc<DatabaseConnection>,
}

impl StatusRepository {
    /// Create a new status repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a status by ID. Soft-deleted statuses are not returned.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<status::Model>> {
        Status::find_by_id(id)
            .filter(status::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a status by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<status::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::StatusNotFound(id.to_string()))
    }

    /// Mentions of a status, silent ones included.
    pub async fn mentions(&self, status_id: &str) -> AppResult<Vec<mention::Model>> {
        Mention::find()
            .filter(mention::Column::StatusId.eq(status_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accounts that reblogged a status.
    ///
    /// Reblogs soft-deleted together with the status (same `deleted_at`) are
    /// included.
    pub async fn reblogger_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        self.derived_account_ids(status::Column::ReblogOfId, status_id, deleted_at)
            .await
    }

    /// Accounts that replied to a status, with the same deletion rule as
    /// [`Self::reblogger_ids`].
    pub async fn replier_ids(
        &self,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        self.derived_account_ids(status::Column::InReplyToId, status_id, deleted_at)
            .await
    }

    async fn derived_account_ids(
        &self,
        link: status::Column,
        status_id: &str,
        deleted_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<String>> {
        let deleted = match deleted_at {
            Some(at) => status::Column::DeletedAt
                .is_null()
                .or(status::Column::DeletedAt.eq(at)),
            None => status::Column::DeletedAt.is_null(),
        };

        Status::find()
            .select_only()
            .column(status::Column::AccountId)
            .distinct()
            .filter(link.eq(status_id))
            .filter(deleted)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` has reblogged `status_id`.
    pub async fn has_reblogged(&self, account_id: &str, status_id: &str) -> AppResult<bool> {
        Status::find()
            .filter(status::Column::AccountId.eq(account_id))
            .filter(status::Column::ReblogOfId.eq(status_id))
            .filter(status::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bump `updated_at` so cached renderings of the status go stale.
    pub async fn touch(&self, id: &str) -> AppResult<()> {
        Status::update_many()
            .col_expr(status::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(status::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find the client application of a status.
    pub async fn find_application(&self, id: &str) -> AppResult<Option<application::Model>> {
        Application::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
