//! Process-local repository backed by vectors behind a mutex.
//!
//! Nothing survives the process; useful for tests and throwaway sessions
//! (`--backend memory`).

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{ProdScoreRepository, RepositoryError};
use crate::models::{Charge, NewCharge, NewProduct, Product, Profile, Scoreboard};

#[derive(Debug, Default)]
struct State {
    profile: Option<Profile>,
    charges: Vec<Charge>,
    products: Vec<Product>,
    selected_product_id: Option<i64>,
    scoreboard: Option<Scoreboard>,
    // Ids are never reused, matching AUTOINCREMENT in the SQLite schema
    last_charge_id: i64,
    last_product_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::Database(format!("state lock poisoned: {e}")))
    }
}

#[async_trait]
impl ProdScoreRepository for MemoryRepository {
    async fn get_profile(&self) -> Result<Profile, RepositoryError> {
        self.state()?.profile.clone().ok_or(RepositoryError::NotFound)
    }

    async fn save_profile(
        &self,
        profile: &Profile,
    ) -> Result<(), RepositoryError> {
        self.state()?.profile = Some(profile.clone());
        Ok(())
    }

    async fn list_charges(&self) -> Result<Vec<Charge>, RepositoryError> {
        Ok(self.state()?.charges.clone())
    }

    async fn create_charge(
        &self,
        charge: NewCharge,
    ) -> Result<Charge, RepositoryError> {
        let mut state = self.state()?;
        state.last_charge_id += 1;
        let created = Charge {
            id: state.last_charge_id,
            name: charge.name,
            amount_per_month: charge.amount_per_month,
        };
        state.charges.push(created.clone());
        Ok(created)
    }

    async fn create_charges(
        &self,
        charges: Vec<NewCharge>,
    ) -> Result<Vec<Charge>, RepositoryError> {
        let mut state = self.state()?;
        let mut created = Vec::with_capacity(charges.len());
        for charge in charges {
            state.last_charge_id += 1;
            created.push(Charge {
                id: state.last_charge_id,
                name: charge.name,
                amount_per_month: charge.amount_per_month,
            });
        }
        state.charges.extend(created.iter().cloned());
        Ok(created)
    }

    async fn delete_charge(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let before = state.charges.len();
        state.charges.retain(|c| c.id != id);
        if state.charges.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.state()?.products.clone())
    }

    async fn get_product(
        &self,
        id: i64,
    ) -> Result<Product, RepositoryError> {
        self.state()?
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<Product, RepositoryError> {
        let mut state = self.state()?;
        state.last_product_id += 1;
        let created = Product {
            id: state.last_product_id,
            name: product.name,
            price: product.price,
            image_data: product.image_data,
            source_url: product.source_url,
            hours_worked: rust_decimal::Decimal::ZERO,
            created_at: Utc::now(),
        };
        state.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let stored = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = product.clone();
        Ok(())
    }

    async fn delete_product(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_selected_product_id(&self) -> Result<Option<i64>, RepositoryError> {
        Ok(self.state()?.selected_product_id)
    }

    async fn set_selected_product_id(
        &self,
        id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        self.state()?.selected_product_id = id;
        Ok(())
    }

    async fn get_scoreboard(&self) -> Result<Scoreboard, RepositoryError> {
        self.state()?.scoreboard.clone().ok_or(RepositoryError::NotFound)
    }

    async fn save_scoreboard(
        &self,
        scoreboard: &Scoreboard,
    ) -> Result<(), RepositoryError> {
        self.state()?.scoreboard = Some(scoreboard.clone());
        Ok(())
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. Every call to `create`
/// returns a fresh, empty store.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn ProdScoreRepository>, RepositoryError> {
        Ok(Box::new(MemoryRepository::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn profile_not_found_until_saved() {
        let repo = MemoryRepository::new();

        assert_eq!(repo.get_profile().await, Err(RepositoryError::NotFound));

        let profile = Profile {
            hourly_rate: dec!(25),
            hours_per_week: dec!(35),
            onboarding_complete: true,
        };
        repo.save_profile(&profile).await.unwrap();

        assert_eq!(repo.get_profile().await, Ok(profile));
    }

    #[tokio::test]
    async fn charges_keep_insertion_order_and_never_reuse_ids() {
        let repo = MemoryRepository::new();

        let rent = repo
            .create_charge(NewCharge {
                name: "Rent".to_string(),
                amount_per_month: dec!(650),
            })
            .await
            .unwrap();
        let phone = repo
            .create_charge(NewCharge {
                name: "Phone".to_string(),
                amount_per_month: dec!(20),
            })
            .await
            .unwrap();
        repo.delete_charge(phone.id).await.unwrap();
        let gym = repo
            .create_charge(NewCharge {
                name: "Gym".to_string(),
                amount_per_month: dec!(30),
            })
            .await
            .unwrap();

        let names: Vec<_> = repo
            .list_charges()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Rent", "Gym"]);
        assert_eq!((rent.id, phone.id, gym.id), (1, 2, 3));
    }

    #[tokio::test]
    async fn create_charges_appends_batch_in_order() {
        let repo = MemoryRepository::new();
        repo.create_charge(NewCharge {
            name: "Rent".to_string(),
            amount_per_month: dec!(650),
        })
        .await
        .unwrap();

        let created = repo
            .create_charges(vec![
                NewCharge {
                    name: "Phone".to_string(),
                    amount_per_month: dec!(20),
                },
                NewCharge {
                    name: "Gym".to_string(),
                    amount_per_month: dec!(30),
                },
            ])
            .await
            .unwrap();

        let ids: Vec<_> = created.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(repo.list_charges().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_missing_charge_is_not_found() {
        let repo = MemoryRepository::new();

        assert_eq!(repo.delete_charge(9).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn product_create_update_delete() {
        let repo = MemoryRepository::new();

        let mut product = repo
            .create_product(NewProduct::new("Bike", dec!(480)).with_source_url("https://shop.example/bike"))
            .await
            .unwrap();
        assert_eq!(product.hours_worked, dec!(0));
        assert_eq!(product.source_url.as_deref(), Some("https://shop.example/bike"));

        product.hours_worked = dec!(2.5);
        repo.update_product(&product).await.unwrap();
        assert_eq!(repo.get_product(product.id).await.unwrap().hours_worked, dec!(2.5));

        repo.delete_product(product.id).await.unwrap();
        assert_eq!(repo.get_product(product.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.update_product(&product).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn selection_is_stored_verbatim() {
        let repo = MemoryRepository::new();

        assert_eq!(repo.get_selected_product_id().await, Ok(None));
        repo.set_selected_product_id(Some(42)).await.unwrap();
        assert_eq!(repo.get_selected_product_id().await, Ok(Some(42)));
        repo.set_selected_product_id(None).await.unwrap();
        assert_eq!(repo.get_selected_product_id().await, Ok(None));
    }

    #[tokio::test]
    async fn scoreboard_round_trip() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.get_scoreboard().await, Err(RepositoryError::NotFound));

        let board = Scoreboard {
            score: 3,
            message: "Ship it".to_string(),
        };
        repo.save_scoreboard(&board).await.unwrap();

        assert_eq!(repo.get_scoreboard().await, Ok(board));
    }

    #[tokio::test]
    async fn factory_returns_empty_store() {
        let repo = MemoryRepositoryFactory
            .create(&DbConfig::default())
            .await
            .unwrap();

        assert!(repo.list_products().await.unwrap().is_empty());
        assert_eq!(MemoryRepositoryFactory.backend_name(), "memory");
    }
}
