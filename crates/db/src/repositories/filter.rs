//! Custom filter repository.

use std::sync::Arc;

use crate::entities::{
    CustomFilter, CustomFilterKeyword, CustomFilterStatus, custom_filter, custom_filter_keyword,
    custom_filter_status,
};
use chrono::Utc;
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// A filter with its keyword and status rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterWithRules {
    pub filter: custom_filter::Model,
    pub keywords: Vec<custom_filter_keyword::Model>,
    pub statuses: Vec<custom_filter_status::Model>,
}

/// Custom filter repository for database operations.
#[derive(Clone)]
pub struct FilterRepository {
    db: Arc<DatabaseConnection>,
}

impl FilterRepository {
    /// Create a new filter repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Unexpired filters of an account, with their rules.
    pub async fn find_active_by_account(&self, account_id: &str) -> AppResult<Vec<FilterWithRules>> {
        let now = Utc::now();

        let filters = CustomFilter::find()
            .filter(custom_filter::Column::AccountId.eq(account_id))
            .filter(
                Condition::any()
                    .add(custom_filter::Column::ExpiresAt.is_null())
                    .add(custom_filter::Column::ExpiresAt.gt(now)),
            )
            .order_by_asc(custom_filter::Column::Id)
            .find_with_related(CustomFilterKeyword)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if filters.is_empty() {
            return Ok(Vec::new());
        }

        let filter_ids: Vec<String> = filters.iter().map(|(f, _)| f.id.clone()).collect();
        let statuses = CustomFilterStatus::find()
            .filter(custom_filter_status::Column::CustomFilterId.is_in(filter_ids))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(filters
            .into_iter()
            .map(|(filter, keywords)| {
                let statuses = statuses
                    .iter()
                    .filter(|s| s.custom_filter_id == filter.id)
                    .cloned()
                    .collect();
                FilterWithRules {
                    filter,
                    keywords,
                    statuses,
                }
            })
            .collect())
    }
}
