//! Home-screen widget snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{clamp_unit, round_half_up};
use crate::calculations::{HoursEstimate, ProductProgress, format_hours};
use crate::models::Scoreboard;

const BAR_WIDTH: u32 = 20;

/// The product half of a widget entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetProduct {
    pub id: i64,
    pub name: String,
    pub progress: Decimal,
    pub hours_worked: Decimal,
    pub hours_needed: HoursEstimate,
    pub status: String,
}

impl From<&ProductProgress> for WidgetProduct {
    fn from(p: &ProductProgress) -> Self {
        Self {
            id: p.product_id,
            name: p.name.clone(),
            progress: p.progress,
            hours_worked: p.hours_worked,
            hours_needed: p.hours_needed,
            status: p.short_message.clone(),
        }
    }
}

/// Everything the widget renders at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEntry {
    pub generated_at: DateTime<Utc>,
    /// `None` when no product exists yet.
    pub product: Option<WidgetProduct>,
    pub score: i64,
    pub message: String,
}

impl WidgetEntry {
    pub fn new(
        progress: Option<&ProductProgress>,
        scoreboard: &Scoreboard,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            product: progress.map(WidgetProduct::from),
            score: scoreboard.score,
            message: scoreboard.message.clone(),
        }
    }

    /// Progress as a whole percentage, if a product is shown.
    pub fn progress_percent(&self) -> Option<Decimal> {
        self.product
            .as_ref()
            .map(|p| round_half_up(clamp_unit(p.progress) * Decimal::ONE_HUNDRED, 0))
    }
}

/// Text progress bar, `width` cells wide.
pub fn progress_bar(
    progress: Decimal,
    width: u32,
) -> String {
    let width = width as usize;
    let filled = round_half_up(clamp_unit(progress) * Decimal::from(width), 0)
        .to_usize()
        .unwrap_or(0)
        .min(width);
    let empty = width - filled;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(empty))
}

impl fmt::Display for WidgetEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.product {
            Some(product) => {
                writeln!(f, "{}", product.name)?;
                writeln!(
                    f,
                    "{} {}%",
                    progress_bar(product.progress, BAR_WIDTH),
                    self.progress_percent().unwrap_or_default()
                )?;
                writeln!(f, "{}", product.status)?;
                writeln!(
                    f,
                    "{} / {}",
                    format_hours(product.hours_worked),
                    product.hours_needed
                )?;
            }
            None => {
                writeln!(f, "No goal yet")?;
                writeln!(f, "Add a product to start tracking your hours.")?;
            }
        }
        write!(f, "Score: {}", self.score)?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}
