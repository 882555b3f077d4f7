use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Charge, NewCharge, NewProduct, Product, Profile, Scoreboard};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for everything the app persists. Reads and writes are separate
/// operations; derived values (net rate, progress) are never stored.
#[async_trait]
pub trait ProdScoreRepository: Send + Sync {
    // Profile (single record)
    async fn get_profile(&self) -> Result<Profile, RepositoryError>;
    async fn save_profile(
        &self,
        profile: &Profile,
    ) -> Result<(), RepositoryError>;

    // Charges, in insertion order
    async fn list_charges(&self) -> Result<Vec<Charge>, RepositoryError>;
    async fn create_charge(
        &self,
        charge: NewCharge,
    ) -> Result<Charge, RepositoryError>;
    /// Stores every charge or none of them.
    async fn create_charges(
        &self,
        charges: Vec<NewCharge>,
    ) -> Result<Vec<Charge>, RepositoryError>;
    async fn delete_charge(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Products, in insertion order
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product(
        &self,
        id: i64,
    ) -> Result<Product, RepositoryError>;
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<Product, RepositoryError>;
    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), RepositoryError>;
    async fn delete_product(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Widget selection. Returned as stored; it may point at a deleted product.
    async fn get_selected_product_id(&self) -> Result<Option<i64>, RepositoryError>;
    async fn set_selected_product_id(
        &self,
        id: Option<i64>,
    ) -> Result<(), RepositoryError>;

    // Legacy score counter (single record)
    async fn get_scoreboard(&self) -> Result<Scoreboard, RepositoryError>;
    async fn save_scoreboard(
        &self,
        scoreboard: &Scoreboard,
    ) -> Result<(), RepositoryError>;
}
