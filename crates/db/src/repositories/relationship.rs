//! Follow and block relationship repository.

use std::sync::Arc;

use crate::entities::{
    Account, AccountDomainBlock, Block, Follow, account, account_domain_block, block, follow,
};
use fanout_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, QueryTrait,
};

/// Repository for follows, blocks and account domain blocks.
#[derive(Clone)]
pub struct RelationshipRepository {
    db: Arc<DatabaseConnection>,
}

impl RelationshipRepository {
    /// Create a new relationship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if `account_id` follows `target_account_id`.
    pub async fn is_following(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        Follow::find()
            .filter(follow::Column::AccountId.eq(account_id))
            .filter(follow::Column::TargetAccountId.eq(target_account_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` blocks `target_account_id`.
    pub async fn is_blocking(&self, account_id: &str, target_account_id: &str) -> AppResult<bool> {
        Block::find()
            .filter(block::Column::AccountId.eq(account_id))
            .filter(block::Column::TargetAccountId.eq(target_account_id))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `account_id` blocked the whole `domain`.
    pub async fn is_domain_blocking(&self, account_id: &str, domain: &str) -> AppResult<bool> {
        AccountDomainBlock::find()
            .filter(account_domain_block::Column::AccountId.eq(account_id))
            .filter(account_domain_block::Column::Domain.eq(domain))
            .one(self.db.as_ref())
            .await
            .map(|found| found.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All followers of an account.
    pub async fn followers(&self, account_id: &str) -> AppResult<Vec<account::Model>> {
        Account::find()
            .filter(account::Column::Id.in_subquery(follower_ids_query(account_id)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of an account's local followers.
    pub async fn local_follower_ids(&self, account_id: &str) -> AppResult<Vec<String>> {
        Account::find()
            .select_only()
            .column(account::Column::Id)
            .filter(account::Column::Domain.is_null())
            .filter(account::Column::Id.in_subquery(follower_ids_query(account_id)))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Followers of `account_id`, minus remote ones on domains `domain_blocker_id`
    /// has blocked. Local followers are always kept.
    pub async fn followers_outside_blocked_domains(
        &self,
        account_id: &str,
        domain_blocker_id: &str,
    ) -> AppResult<Vec<account::Model>> {
        let blocked_domains = AccountDomainBlock::find()
            .select_only()
            .column(account_domain_block::Column::Domain)
            .filter(account_domain_block::Column::AccountId.eq(domain_blocker_id))
            .into_query();

        Account::find()
            .filter(account::Column::Id.in_subquery(follower_ids_query(account_id)))
            .filter(
                Condition::any()
                    .add(account::Column::Domain.is_null())
                    .add(account::Column::Domain.not_in_subquery(blocked_domains)),
            )
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn follower_ids_query(account_id: &str) -> sea_orm::sea_query::SelectStatement {
    Follow::find()
        .select_only()
        .column(follow::Column::AccountId)
        .filter(follow::Column::TargetAccountId.eq(account_id))
        .into_query()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::account_fixture;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[tokio::test]
    async fn test_is_following() {
        let edge = follow::Model {
            id: "f1".to_string(),
            account_id: "a1".to_string(),
            target_account_id: "a2".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![edge], vec![]])
                .into_connection(),
        );

        let repo = RelationshipRepository::new(db);
        assert!(repo.is_following("a1", "a2").await.unwrap());
        assert!(!repo.is_following("a2", "a1").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_follower_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! { "id" => Value::from("a2") },
                    btreemap! { "id" => Value::from("a3") },
                ]])
                .into_connection(),
        );

        let repo = RelationshipRepository::new(db);
        let ids = repo.local_follower_ids("a1").await.unwrap();

        assert_eq!(ids, vec!["a2".to_string(), "a3".to_string()]);
    }

    #[tokio::test]
    async fn test_followers_outside_blocked_domains() {
        let follower = account_fixture("f1", Some("remote.example"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follower.clone()]])
                .into_connection(),
        );

        let repo = RelationshipRepository::new(db.clone());
        let followers = repo
            .followers_outside_blocked_domains("root", "author")
            .await
            .unwrap();

        assert_eq!(followers, vec![follower]);
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("account_domain_blocks"));
        assert!(sql.contains(r#""domain" IS NULL"#));
        assert!(sql.contains(r#""domain" NOT IN"#));
    }
}
