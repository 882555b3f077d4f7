pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{MemoryRepository, MemoryRepositoryFactory};
pub use repository::{ProdScoreRepository, RepositoryError};
