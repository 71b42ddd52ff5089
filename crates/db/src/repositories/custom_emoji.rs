//! Custom emoji repository.

use std::sync::Arc;

use crate::entities::{CustomEmoji, custom_emoji};
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Custom emoji repository for database operations.
#[derive(Clone)]
pub struct CustomEmojiRepository {
    db: Arc<DatabaseConnection>,
}

impl CustomEmojiRepository {
    /// Create a new custom emoji repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an emoji by shortcode within a domain (`None` = local).
    pub async fn find_by_shortcode(
        &self,
        shortcode: &str,
        domain: Option<&str>,
    ) -> AppResult<Option<custom_emoji::Model>> {
        let domain_filter = match domain {
            Some(domain) => custom_emoji::Column::Domain.eq(domain),
            None => custom_emoji::Column::Domain.is_null(),
        };

        CustomEmoji::find()
            .filter(custom_emoji::Column::Shortcode.eq(shortcode))
            .filter(domain_filter)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find multiple emoji by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<custom_emoji::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        CustomEmoji::find()
            .filter(custom_emoji::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
