//! Notification repository.

use std::sync::Arc;

use crate::entities::notification;
use fanout_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::Model) -> AppResult<notification::Model> {
        model
            .into_active_model()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
