//! User actions over an injected repository.
//!
//! The tracker is the only place that combines stored state with the
//! valuation engine. It reads a snapshot, validates input the way the app's
//! forms do, writes back through the repository, and returns plain values.
//! It keeps no state of its own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{ProductProgress, net_hourly_rate, total_charges_per_month};
use crate::db::repository::{ProdScoreRepository, RepositoryError};
use crate::models::{Charge, NewCharge, NewProduct, Product, Profile, Scoreboard};
use crate::widget::WidgetEntry;

/// Errors returned by [`Tracker`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Onboarding needs a positive wage and a positive weekly schedule.
    #[error("hourly rate and hours per week must both be positive, got {hourly_rate} and {hours_per_week}")]
    InvalidProfile {
        hourly_rate: Decimal,
        hours_per_week: Decimal,
    },

    #[error("name must not be empty")]
    EmptyName,

    #[error("monthly amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("hours to add must be positive, got {0}")]
    NonPositiveHours(Decimal),

    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("charge {0} not found")]
    ChargeNotFound(i64),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Net rate, charges, and per-product progress computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub net_per_hour: Decimal,
    pub total_charges_per_month: Decimal,
    pub products: Vec<ProductProgress>,
}

/// Resolves the product the widget shows: the explicit selection if it still
/// exists, otherwise the first product.
pub fn resolve_selection(
    selected_id: Option<i64>,
    products: &[Product],
) -> Option<&Product> {
    selected_id
        .and_then(|id| products.iter().find(|p| p.id == id))
        .or_else(|| products.first())
}

fn product_not_found(id: i64) -> impl FnOnce(RepositoryError) -> TrackerError {
    move |e| match e {
        RepositoryError::NotFound => TrackerError::ProductNotFound(id),
        other => TrackerError::Repository(other),
    }
}

fn validated_name(name: &str) -> Result<String, TrackerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Application actions for one repository.
#[derive(Clone, Copy)]
pub struct Tracker<'a> {
    repo: &'a dyn ProdScoreRepository,
}

impl<'a> Tracker<'a> {
    pub fn new(repo: &'a dyn ProdScoreRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The stored profile, or the default profile on first launch.
    pub async fn profile(&self) -> Result<Profile, TrackerError> {
        match self.repo.get_profile().await {
            Ok(profile) => Ok(profile),
            Err(RepositoryError::NotFound) => {
                debug!("no stored profile; using default");
                Ok(Profile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stores the wage entered during onboarding and marks it complete.
    pub async fn complete_onboarding(
        &self,
        hourly_rate: Decimal,
        hours_per_week: Decimal,
    ) -> Result<Profile, TrackerError> {
        if hourly_rate <= Decimal::ZERO || hours_per_week <= Decimal::ZERO {
            return Err(TrackerError::InvalidProfile {
                hourly_rate,
                hours_per_week,
            });
        }

        let mut profile = self.profile().await?;
        profile.hourly_rate = hourly_rate;
        profile.hours_per_week = hours_per_week;
        profile.onboarding_complete = true;
        self.repo.save_profile(&profile).await?;

        info!(%hourly_rate, %hours_per_week, "onboarding complete");
        Ok(profile)
    }

    /// Settings edit. Values are stored as given; the valuation engine clamps
    /// degenerate values when computing.
    pub async fn update_profile(
        &self,
        hourly_rate: Decimal,
        hours_per_week: Decimal,
    ) -> Result<Profile, TrackerError> {
        let mut profile = self.profile().await?;
        profile.hourly_rate = hourly_rate;
        profile.hours_per_week = hours_per_week;
        self.repo.save_profile(&profile).await?;

        info!(%hourly_rate, %hours_per_week, "profile updated");
        Ok(profile)
    }

    /// Sends the user back through onboarding without touching their wage.
    pub async fn reset_onboarding(&self) -> Result<Profile, TrackerError> {
        let mut profile = self.profile().await?;
        profile.onboarding_complete = false;
        self.repo.save_profile(&profile).await?;
        Ok(profile)
    }

    // =========================================================================
    // Charges
    // =========================================================================

    pub async fn charges(&self) -> Result<Vec<Charge>, TrackerError> {
        Ok(self.repo.list_charges().await?)
    }

    pub async fn add_charge(
        &self,
        name: &str,
        amount_per_month: Decimal,
    ) -> Result<Charge, TrackerError> {
        let name = validated_name(name)?;
        if amount_per_month <= Decimal::ZERO {
            return Err(TrackerError::NonPositiveAmount(amount_per_month));
        }

        let charge = self
            .repo
            .create_charge(NewCharge {
                name,
                amount_per_month,
            })
            .await?;

        info!(id = charge.id, name = %charge.name, amount = %charge.amount_per_month, "charge added");
        Ok(charge)
    }

    /// Validates every charge, then stores the whole batch in one repository
    /// call. A bad row or a storage failure leaves the existing charges as
    /// they were.
    pub async fn import_charges(
        &self,
        charges: Vec<NewCharge>,
    ) -> Result<Vec<Charge>, TrackerError> {
        let charges = charges
            .into_iter()
            .map(|charge| {
                let name = validated_name(&charge.name)?;
                if charge.amount_per_month <= Decimal::ZERO {
                    return Err(TrackerError::NonPositiveAmount(charge.amount_per_month));
                }
                Ok(NewCharge {
                    name,
                    amount_per_month: charge.amount_per_month,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = self.repo.create_charges(charges).await?;

        info!(count = created.len(), "charges imported");
        Ok(created)
    }

    pub async fn remove_charge(
        &self,
        id: i64,
    ) -> Result<(), TrackerError> {
        self.repo.delete_charge(id).await.map_err(|e| match e {
            RepositoryError::NotFound => TrackerError::ChargeNotFound(id),
            other => other.into(),
        })?;

        info!(id, "charge removed");
        Ok(())
    }

    pub async fn total_charges_per_month(&self) -> Result<Decimal, TrackerError> {
        Ok(total_charges_per_month(&self.charges().await?))
    }

    /// Net hourly rate for the current profile and charges.
    pub async fn net_per_hour(&self) -> Result<Decimal, TrackerError> {
        let profile = self.profile().await?;
        let charges = self.total_charges_per_month().await?;
        Ok(net_hourly_rate(&profile, charges))
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn products(&self) -> Result<Vec<Product>, TrackerError> {
        Ok(self.repo.list_products().await?)
    }

    pub async fn product(
        &self,
        id: i64,
    ) -> Result<Product, TrackerError> {
        self.repo.get_product(id).await.map_err(product_not_found(id))
    }

    /// Adds a product. The first product added while nothing is selected
    /// becomes the widget selection.
    pub async fn add_product(
        &self,
        product: NewProduct,
    ) -> Result<Product, TrackerError> {
        let name = validated_name(&product.name)?;
        if product.price <= Decimal::ZERO {
            return Err(TrackerError::NonPositivePrice(product.price));
        }

        let created = self
            .repo
            .create_product(NewProduct { name, ..product })
            .await?;

        if self.repo.get_selected_product_id().await?.is_none() {
            self.repo.set_selected_product_id(Some(created.id)).await?;
            debug!(id = created.id, "selected new product for widget");
        }

        info!(id = created.id, name = %created.name, price = %created.price, "product added");
        Ok(created)
    }

    /// Logs `hours` of work toward a product.
    pub async fn add_hours(
        &self,
        id: i64,
        hours: Decimal,
    ) -> Result<Product, TrackerError> {
        if hours <= Decimal::ZERO {
            return Err(TrackerError::NonPositiveHours(hours));
        }

        let mut product = self.product(id).await?;
        product.hours_worked = product.hours_worked.saturating_add(hours);
        self.repo
            .update_product(&product)
            .await
            .map_err(product_not_found(id))?;

        info!(id, %hours, total = %product.hours_worked, "hours added");
        Ok(product)
    }

    /// Sets the hours worked on a product back to zero.
    pub async fn reset_hours(
        &self,
        id: i64,
    ) -> Result<Product, TrackerError> {
        let mut product = self.product(id).await?;
        product.hours_worked = Decimal::ZERO;
        self.repo
            .update_product(&product)
            .await
            .map_err(product_not_found(id))?;

        info!(id, "hours reset");
        Ok(product)
    }

    /// Deletes a product. If it was selected, the selection moves to the new
    /// first product, or to none.
    pub async fn remove_product(
        &self,
        id: i64,
    ) -> Result<(), TrackerError> {
        self.repo
            .delete_product(id)
            .await
            .map_err(product_not_found(id))?;

        if self.repo.get_selected_product_id().await? == Some(id) {
            let fallback = self.repo.list_products().await?.first().map(|p| p.id);
            self.repo.set_selected_product_id(fallback).await?;
            debug!(?fallback, "selection moved after delete");
        }

        info!(id, "product removed");
        Ok(())
    }

    /// Shows a product in the widget.
    pub async fn select_product(
        &self,
        id: i64,
    ) -> Result<Product, TrackerError> {
        let product = self.product(id).await?;
        self.repo.set_selected_product_id(Some(id)).await?;

        info!(id, "product selected for widget");
        Ok(product)
    }

    /// The product the widget shows, if there is any product at all.
    pub async fn selected_product(&self) -> Result<Option<Product>, TrackerError> {
        let selected_id = self.repo.get_selected_product_id().await?;
        let products = self.repo.list_products().await?;
        Ok(resolve_selection(selected_id, &products).cloned())
    }

    /// Widget "add hour" action: logs hours on the selected product.
    /// Returns `None` when there is no product to credit.
    pub async fn add_hours_to_selected(
        &self,
        hours: Decimal,
    ) -> Result<Option<Product>, TrackerError> {
        match self.selected_product().await? {
            Some(product) => self.add_hours(product.id, hours).await.map(Some),
            None => {
                debug!("no product to credit hours to");
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Progress
    // =========================================================================

    pub async fn progress_for(
        &self,
        id: i64,
    ) -> Result<ProductProgress, TrackerError> {
        let product = self.product(id).await?;
        let net = self.net_per_hour().await?;
        Ok(ProductProgress::evaluate(&product, net))
    }

    /// Evaluates every product against a single net-rate computation.
    pub async fn overview(&self) -> Result<Overview, TrackerError> {
        let profile = self.profile().await?;
        let total_charges = self.total_charges_per_month().await?;
        let net_per_hour = net_hourly_rate(&profile, total_charges);

        let products = self
            .products()
            .await?
            .iter()
            .map(|p| ProductProgress::evaluate(p, net_per_hour))
            .collect();

        Ok(Overview {
            net_per_hour,
            total_charges_per_month: total_charges,
            products,
        })
    }

    /// What the home-screen widget renders right now.
    pub async fn widget_entry(&self) -> Result<WidgetEntry, TrackerError> {
        let progress = match self.selected_product().await? {
            Some(product) => {
                let net = self.net_per_hour().await?;
                Some(ProductProgress::evaluate(&product, net))
            }
            None => None,
        };
        let scoreboard = self.scoreboard().await?;

        Ok(WidgetEntry::new(progress.as_ref(), &scoreboard))
    }

    // =========================================================================
    // Scoreboard
    // =========================================================================

    pub async fn scoreboard(&self) -> Result<Scoreboard, TrackerError> {
        match self.repo.get_scoreboard().await {
            Ok(board) => Ok(board),
            Err(RepositoryError::NotFound) => Ok(Scoreboard::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn adjust_score(
        &self,
        delta: i64,
    ) -> Result<Scoreboard, TrackerError> {
        let mut board = self.scoreboard().await?;
        board.adjust(delta);
        self.repo.save_scoreboard(&board).await?;
        Ok(board)
    }

    pub async fn reset_score(&self) -> Result<Scoreboard, TrackerError> {
        let mut board = self.scoreboard().await?;
        board.reset();
        self.repo.save_scoreboard(&board).await?;
        Ok(board)
    }

    pub async fn set_score_message(
        &self,
        message: &str,
    ) -> Result<Scoreboard, TrackerError> {
        let mut board = self.scoreboard().await?;
        board.message = message.to_string();
        self.repo.save_scoreboard(&board).await?;
        Ok(board)
    }
}
