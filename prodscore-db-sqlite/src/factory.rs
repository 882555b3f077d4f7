use async_trait::async_trait;

use prodscore_core::db::repository::{ProdScoreRepository, RepositoryError};
use prodscore_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use prodscore_core::db::RepositoryRegistry;
/// use prodscore_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"prodscore.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"` for an ephemeral database.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ProdScoreRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        tracing::info!(path = %config.connection_string, "sqlite repository ready");
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use prodscore_core::db::{DbConfig, ProdScoreRepository, RepositoryFactory};

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = match SqliteRepositoryFactory.create(&config).await {
            Ok(repo) => repo,
            Err(e) => panic!("failed to create in-memory repository: {e:#?}"),
        };

        assert!(repo.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unusable_path_is_connection_error() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "/nonexistent-dir/for/prodscore.db".to_string(),
        };

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(matches!(
            result,
            Err(prodscore_core::RepositoryError::Connection(_))
        ));
    }
}
