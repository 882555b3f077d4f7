//! SQLite storage for ProdScore.
//!
//! Register [`SqliteRepositoryFactory`] with a
//! [`prodscore_core::db::RepositoryRegistry`] to make the `"sqlite"` backend
//! available.

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
