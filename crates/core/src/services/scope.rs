//! Local audience of a status.

use fanout_common::AppResult;
use fanout_db::entities::status::{self, Visibility};

use crate::services::store::StoreService;

/// Maps a status visibility to the local accounts eligible for live delivery.
///
/// The scope is deliberately broad; the stream fan-out narrows it by
/// subscription state and timeline preferences.
#[derive(Clone)]
pub struct DistributionScope {
    store: StoreService,
}

impl DistributionScope {
    #[must_use]
    pub const fn new(store: StoreService) -> Self {
        Self { store }
    }

    /// Local account IDs that may see `status` live.
    pub async fn scope_for(&self, status: &status::Model) -> AppResult<Vec<String>> {
        match status.visibility {
            Visibility::Public
            | Visibility::Unlisted
            | Visibility::PublicUnlisted
            | Visibility::Login => self.store.local_account_ids().await,
            Visibility::Private => {
                let mut ids = self.store.local_follower_ids(&status.account_id).await?;
                if !ids.contains(&status.account_id) {
                    ids.push(status.account_id.clone());
                }
                Ok(ids)
            }
            Visibility::Limited | Visibility::Direct => self.mentioned_local_ids(status).await,
        }
    }

    async fn mentioned_local_ids(&self, status: &status::Model) -> AppResult<Vec<String>> {
        let mentioned: Vec<String> = self
            .store
            .mentions(&status.id)
            .await?
            .into_iter()
            .filter(|m| !m.silent)
            .map(|m| m.account_id)
            .collect();

        if mentioned.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .store
            .find_accounts(&mentioned)
            .await?
            .into_iter()
            .filter(|a| a.is_local())
            .map(|a| a.id)
            .collect())
    }
}
