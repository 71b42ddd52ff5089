//! Account repository.

use std::sync::Arc;

use crate::entities::{Account, account};
use fanout_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Account repository for database operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account::Model>> {
        Account::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an account by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    /// Find multiple accounts by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<account::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Account::find()
            .filter(account::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accounts among `ids` whose domain is in `domains`.
    pub async fn find_by_ids_in_domains(
        &self,
        ids: &[String],
        domains: &[String],
    ) -> AppResult<Vec<account::Model>> {
        if ids.is_empty() || domains.is_empty() {
            return Ok(Vec::new());
        }

        Account::find()
            .filter(account::Column::Id.is_in(ids.to_vec()))
            .filter(account::Column::Domain.is_in(domains.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of all local accounts.
    pub async fn local_ids(&self) -> AppResult<Vec<String>> {
        Account::find()
            .select_only()
            .column(account::Column::Id)
            .filter(account::Column::Domain.is_null())
            .order_by_asc(account::Column::Id)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::account_fixture;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_id_found() {
        let account = account_fixture("a1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account.clone()]])
                .into_connection(),
        );

        let repo = AccountRepository::new(db);
        let result = repo.find_by_id("a1").await.unwrap();

        assert_eq!(result, Some(account));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<account::Model>::new()])
                .into_connection(),
        );

        let repo = AccountRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No query results appended: a query would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = AccountRepository::new(db);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
        assert!(
            repo.find_by_ids_in_domains(&["a1".to_string()], &[])
                .await
                .unwrap()
                .is_empty()
        );
    }
}
