use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{ProdScoreRepository, RepositoryError};

/// Which storage backend to open, and how.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory
/// untouched.
///
/// | backend  | connection_string examples          |
/// |----------|-------------------------------------|
/// | `sqlite` | `prodscore.db`, `:memory:`          |
/// | `memory` | ignored                             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "prodscore.db".to_string(),
        }
    }
}

/// Opens repositories for one storage backend. Backends register a factory
/// with a [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a ready-to-use repository.
    /// Migrations, if any, run here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ProdScoreRepository>, RepositoryError>;
}

/// Factories keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Open a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory is registered
    ///   under that name.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ProdScoreRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        tracing::debug!(backend = factory.backend_name(), "opening repository");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
