//! Repository for instance-level federation state: relays, remote software,
//! domain blocks and friend servers.

use std::sync::Arc;

use crate::entities::{
    DomainBlock, FriendDomain, InstanceInfo, Relay, domain_block, friend_domain, friend_domain::FriendState,
    instance_info, relay,
};
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

/// Federation state repository for database operations.
#[derive(Clone)]
pub struct FederationRepository {
    db: Arc<DatabaseConnection>,
}

impl FederationRepository {
    /// Create a new federation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inboxes of enabled relays.
    pub async fn enabled_relay_inboxes(&self) -> AppResult<Vec<String>> {
        Relay::find()
            .select_only()
            .column(relay::Column::InboxUrl)
            .filter(relay::Column::Enabled.eq(true))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Domains whose reported software is one of `software`.
    pub async fn domains_running(&self, software: &[String]) -> AppResult<Vec<String>> {
        if software.is_empty() {
            return Ok(Vec::new());
        }

        InstanceInfo::find()
            .select_only()
            .column(instance_info::Column::Domain)
            .filter(instance_info::Column::Software.is_in(software.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Blocked domains flagged for invalid subscription detection.
    pub async fn invalid_subscription_domains(&self) -> AppResult<Vec<String>> {
        DomainBlock::find()
            .select_only()
            .column(domain_block::Column::Domain)
            .filter(domain_block::Column::DetectInvalidSubscription.eq(true))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Available friend servers that accepted our request.
    pub async fn friend_domains(&self) -> AppResult<Vec<String>> {
        FriendDomain::find()
            .select_only()
            .column(friend_domain::Column::Domain)
            .filter(friend_domain::Column::Available.eq(true))
            .filter(friend_domain::Column::ActiveState.eq(FriendState::Accepted))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
