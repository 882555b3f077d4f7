use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prodscore_core::{
    Charge, NewCharge, NewProduct, ProdScoreRepository, Product, Profile, RepositoryError,
    Scoreboard,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};

use crate::decimal::{decimal_to_text, get_decimal};

const PRODUCT_COLUMNS: &str =
    "id, name, price, image_data, source_url, hours_worked, created_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open `database_url`, creating the file if it does not exist.
    ///
    /// Accepts a bare path (`prodscore.db`), a `sqlite:` URL, or `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_charge(row: &SqliteRow) -> Result<Charge, RepositoryError> {
    Ok(Charge {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        amount_per_month: get_decimal(row, "amount_per_month")?,
    })
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        price: get_decimal(row, "price")?,
        image_data: row.try_get("image_data").map_err(db_err)?,
        source_url: row.try_get("source_url").map_err(db_err)?,
        hours_worked: get_decimal(row, "hours_worked")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

#[async_trait]
impl ProdScoreRepository for SqliteRepository {
    async fn get_profile(&self) -> Result<Profile, RepositoryError> {
        let row = sqlx::query(
            "SELECT hourly_rate, hours_per_week, onboarding_complete FROM profile WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Profile {
            hourly_rate: get_decimal(&row, "hourly_rate")?,
            hours_per_week: get_decimal(&row, "hours_per_week")?,
            onboarding_complete: row.try_get("onboarding_complete").map_err(db_err)?,
        })
    }

    async fn save_profile(
        &self,
        profile: &Profile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO profile (id, hourly_rate, hours_per_week, onboarding_complete)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                hourly_rate = excluded.hourly_rate,
                hours_per_week = excluded.hours_per_week,
                onboarding_complete = excluded.onboarding_complete",
        )
        .bind(decimal_to_text(profile.hourly_rate))
        .bind(decimal_to_text(profile.hours_per_week))
        .bind(profile.onboarding_complete)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_charges(&self) -> Result<Vec<Charge>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, amount_per_month FROM charges ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_charge).collect()
    }

    async fn create_charge(
        &self,
        charge: NewCharge,
    ) -> Result<Charge, RepositoryError> {
        let result = sqlx::query("INSERT INTO charges (name, amount_per_month) VALUES (?, ?)")
            .bind(&charge.name)
            .bind(decimal_to_text(charge.amount_per_month))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Charge {
            id: result.last_insert_rowid(),
            name: charge.name,
            amount_per_month: charge.amount_per_month,
        })
    }

    async fn create_charges(
        &self,
        charges: Vec<NewCharge>,
    ) -> Result<Vec<Charge>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut created = Vec::with_capacity(charges.len());

        for charge in charges {
            let result = sqlx::query("INSERT INTO charges (name, amount_per_month) VALUES (?, ?)")
                .bind(&charge.name)
                .bind(decimal_to_text(charge.amount_per_month))
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            created.push(Charge {
                id: result.last_insert_rowid(),
                name: charge.name,
                amount_per_month: charge.amount_per_month,
            });
        }

        // Dropping `tx` on an early return rolls the batch back.
        tx.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn delete_charge(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM charges WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_product).collect()
    }

    async fn get_product(
        &self,
        id: i64,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_product(&row)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO products (name, price, image_data, source_url, hours_worked, created_at)
             VALUES (?, ?, ?, ?, '0', ?)",
        )
        .bind(&product.name)
        .bind(decimal_to_text(product.price))
        .bind(&product.image_data)
        .bind(&product.source_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_product(result.last_insert_rowid()).await
    }

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET
                name = ?, price = ?, image_data = ?, source_url = ?, hours_worked = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(decimal_to_text(product.price))
        .bind(&product.image_data)
        .bind(&product.source_url)
        .bind(decimal_to_text(product.hours_worked))
        .bind(product.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_product(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_selected_product_id(&self) -> Result<Option<i64>, RepositoryError> {
        let row = sqlx::query("SELECT product_id FROM widget_selection WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => row.try_get("product_id").map_err(db_err),
            None => Ok(None),
        }
    }

    async fn set_selected_product_id(
        &self,
        id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO widget_selection (id, product_id) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET product_id = excluded.product_id",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_scoreboard(&self) -> Result<Scoreboard, RepositoryError> {
        let row = sqlx::query("SELECT score, message FROM scoreboard WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Scoreboard {
            score: row.try_get("score").map_err(db_err)?,
            message: row.try_get("message").map_err(db_err)?,
        })
    }

    async fn save_scoreboard(
        &self,
        scoreboard: &Scoreboard,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO scoreboard (id, score, message) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                score = excluded.score,
                message = excluded.message",
        )
        .bind(scoreboard.score)
        .bind(&scoreboard.message)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use prodscore_core::Tracker;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn charge(
        name: &str,
        amount: rust_decimal::Decimal,
    ) -> NewCharge {
        NewCharge {
            name: name.to_string(),
            amount_per_month: amount,
        }
    }

    // =========================================================================
    // Profile tests
    // =========================================================================

    #[tokio::test]
    async fn test_get_profile_not_found_on_empty_db() {
        let repo = setup_test_db().await;

        let result = repo.get_profile().await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_save_profile_upserts_single_row() {
        let repo = setup_test_db().await;
        let first = Profile {
            hourly_rate: dec!(18.50),
            hours_per_week: dec!(35),
            onboarding_complete: true,
        };
        let second = Profile {
            hourly_rate: dec!(22.75),
            hours_per_week: dec!(28.5),
            onboarding_complete: false,
        };

        repo.save_profile(&first).await.expect("Failed to save profile");
        repo.save_profile(&second).await.expect("Failed to save profile");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
            .fetch_one(repo.pool())
            .await
            .expect("Failed to count");
        assert_eq!(count, 1);
        assert_eq!(repo.get_profile().await, Ok(second));
    }

    // =========================================================================
    // Charge tests
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_list_charges() {
        let repo = setup_test_db().await;

        let rent = repo.create_charge(charge("Rent", dec!(650))).await.unwrap();
        let phone = repo.create_charge(charge("Phone", dec!(19.99))).await.unwrap();

        let result = repo.list_charges().await.unwrap();

        assert_eq!(result, vec![rent, phone]);
        assert_eq!(result[1].amount_per_month, dec!(19.99));
    }

    #[tokio::test]
    async fn test_delete_charge() {
        let repo = setup_test_db().await;
        let rent = repo.create_charge(charge("Rent", dec!(650))).await.unwrap();

        repo.delete_charge(rent.id).await.unwrap();

        assert!(repo.list_charges().await.unwrap().is_empty());
        assert_eq!(repo.delete_charge(rent.id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_create_charges_stores_batch() {
        let repo = setup_test_db().await;

        let created = repo
            .create_charges(vec![charge("Rent", dec!(650)), charge("Phone", dec!(19.99))])
            .await
            .unwrap();

        assert_eq!(repo.list_charges().await.unwrap(), created);
        assert_eq!(created[1].amount_per_month, dec!(19.99));
    }

    #[tokio::test]
    async fn test_create_charges_rolls_back_when_a_row_fails() {
        let repo = setup_test_db().await;
        sqlx::query(
            "CREATE TRIGGER reject_gym BEFORE INSERT ON charges
             WHEN NEW.name = 'Gym'
             BEGIN SELECT RAISE(ABORT, 'disk full'); END",
        )
        .execute(repo.pool())
        .await
        .expect("Failed to create trigger");

        let result = repo
            .create_charges(vec![
                charge("Rent", dec!(650)),
                charge("Gym", dec!(29.90)),
                charge("Phone", dec!(19.99)),
            ])
            .await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("disk full")));
        assert!(repo.list_charges().await.unwrap().is_empty());
    }

    // =========================================================================
    // Product tests
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = setup_test_db().await;

        let created = repo
            .create_product(
                NewProduct::new("Road bike", dec!(1299.90))
                    .with_source_url("https://shop.example/bike")
                    .with_image_data(vec![0x89, 0x50, 0x4e, 0x47]),
            )
            .await
            .expect("Failed to create product");

        let fetched = repo.get_product(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.price, dec!(1299.90));
        assert_eq!(fetched.hours_worked, dec!(0));
        assert_eq!(fetched.image_data, Some(vec![0x89, 0x50, 0x4e, 0x47]));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_product(999).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_product_hours() {
        let repo = setup_test_db().await;
        let mut product = repo
            .create_product(NewProduct::new("Lamp", dec!(100)))
            .await
            .unwrap();

        product.hours_worked = dec!(3.25);
        repo.update_product(&product).await.unwrap();

        assert_eq!(repo.get_product(product.id).await.unwrap().hours_worked, dec!(3.25));
    }

    #[tokio::test]
    async fn test_update_product_not_found() {
        let repo = setup_test_db().await;
        let mut product = repo
            .create_product(NewProduct::new("Lamp", dec!(100)))
            .await
            .unwrap();
        repo.delete_product(product.id).await.unwrap();
        product.hours_worked = dec!(1);

        let result = repo.update_product(&product).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_products_in_creation_order() {
        let repo = setup_test_db().await;
        repo.create_product(NewProduct::new("Bike", dec!(500))).await.unwrap();
        repo.create_product(NewProduct::new("Laptop", dec!(1500))).await.unwrap();

        let names: Vec<_> = repo
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Bike", "Laptop"]);
    }

    // =========================================================================
    // Selection and scoreboard tests
    // =========================================================================

    #[tokio::test]
    async fn test_selected_product_id_round_trip() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_selected_product_id().await, Ok(None));

        repo.set_selected_product_id(Some(7)).await.unwrap();
        assert_eq!(repo.get_selected_product_id().await, Ok(Some(7)));

        repo.set_selected_product_id(None).await.unwrap();
        assert_eq!(repo.get_selected_product_id().await, Ok(None));
    }

    #[tokio::test]
    async fn test_scoreboard_round_trip() {
        let repo = setup_test_db().await;
        assert_eq!(repo.get_scoreboard().await, Err(RepositoryError::NotFound));

        let board = Scoreboard {
            score: -2,
            message: "Focus".to_string(),
        };
        repo.save_scoreboard(&board).await.unwrap();

        assert_eq!(repo.get_scoreboard().await, Ok(board));
    }

    // =========================================================================
    // Tracker over SQLite
    // =========================================================================

    #[tokio::test]
    async fn test_tracker_flow_persists_through_sqlite() {
        let repo = setup_test_db().await;
        let tracker = Tracker::new(&repo);

        tracker.complete_onboarding(dec!(25), dec!(20)).await.unwrap();
        tracker.add_charge("Rent", dec!(866)).await.unwrap();
        let bike = tracker
            .add_product(NewProduct::new("Bike", dec!(300)))
            .await
            .unwrap();
        tracker.add_hours_to_selected(dec!(5)).await.unwrap();

        let progress = tracker.progress_for(bike.id).await.unwrap();

        assert_eq!(tracker.net_per_hour().await.unwrap(), dec!(15));
        assert_eq!(progress.hours_worked, dec!(5));
        assert_eq!(progress.progress, dec!(0.25));
        assert_eq!(progress.short_message, "15h remaining");
        assert_eq!(repo.get_selected_product_id().await, Ok(Some(bike.id)));
    }
}
