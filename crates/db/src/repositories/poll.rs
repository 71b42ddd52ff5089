//! Poll repository.

use std::sync::Arc;

use crate::entities::{Poll, PollVote, poll, poll_vote};
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Choices `account_id` voted for, in vote order.
    pub async fn own_choices(&self, poll_id: &str, account_id: &str) -> AppResult<Vec<i32>> {
        PollVote::find()
            .select_only()
            .column(poll_vote::Column::Choice)
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::AccountId.eq(account_id))
            .order_by_asc(poll_vote::Column::Id)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
