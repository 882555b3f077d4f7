//! Valuation engine: converts a wage profile and a product price into hours.
//!
//! Every function here is total. Degenerate inputs (no wage, no hours, charges
//! that swallow the whole wage, arithmetic overflow) never fail; they map to a
//! zero rate, zero progress, or an [`HoursEstimate::Unreachable`] goal.
//!
//! # Derivation
//!
//! | Value | Formula |
//! |-------|---------|
//! | total charges | sum of every charge's monthly amount |
//! | net per hour | `max(0, rate - charges / (hours_per_week * 4.33))`, or 0 without a wage or schedule |
//! | hours needed | `price / net_per_hour`, unreachable when the net rate is 0 |
//! | hours remaining | `max(0, hours_needed - hours_worked)` |
//! | progress | `min(1, hours_worked / hours_needed)`, 0 when unreachable |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use prodscore_core::Profile;
//! use prodscore_core::calculations::{HoursEstimate, hours_needed, net_hourly_rate, progress};
//!
//! let profile = Profile {
//!     hourly_rate: dec!(25),
//!     hours_per_week: dec!(35),
//!     onboarding_complete: true,
//! };
//!
//! let net = net_hourly_rate(&profile, dec!(0));
//! assert_eq!(net, dec!(25));
//!
//! assert_eq!(hours_needed(dec!(1000), net), HoursEstimate::Reachable(dec!(40)));
//! assert_eq!(progress(dec!(1000), dec!(10), net), dec!(0.25));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{WEEKS_PER_MONTH, clamp_unit};
use crate::calculations::messages::{format_hours, long_message, short_message};
use crate::models::{Charge, Product, Profile};

/// Number of hours a goal takes, or the fact that it can never be reached.
///
/// Used instead of a floating-point infinity so that an unreachable goal can
/// never leak into further arithmetic or serialization by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoursEstimate {
    Reachable(Decimal),
    /// The net hourly rate is zero, so no amount of work gets there.
    Unreachable,
}

impl HoursEstimate {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable(_))
    }

    /// The number of hours, if the goal is reachable.
    pub fn hours(&self) -> Option<Decimal> {
        match self {
            Self::Reachable(hours) => Some(*hours),
            Self::Unreachable => None,
        }
    }

    /// Whether the estimate is reachable and no greater than `limit`.
    ///
    /// Unreachable sorts above every finite limit.
    pub fn at_most(
        &self,
        limit: Decimal,
    ) -> bool {
        matches!(self, Self::Reachable(hours) if *hours <= limit)
    }
}

impl fmt::Display for HoursEstimate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Reachable(hours) => f.write_str(&format_hours(*hours)),
            Self::Unreachable => f.write_str("---"),
        }
    }
}

/// Sums the monthly amount of every charge.
pub fn total_charges_per_month(charges: &[Charge]) -> Decimal {
    charges
        .iter()
        .fold(Decimal::ZERO, |total, charge| total.saturating_add(charge.amount_per_month))
}

/// Effective hourly earnings once monthly charges are spread over the hours
/// worked in a month.
///
/// Returns zero when the profile has no positive wage or weekly schedule, and
/// never returns a negative rate: charges larger than the wage floor it at 0.
pub fn net_hourly_rate(
    profile: &Profile,
    total_monthly_charges: Decimal,
) -> Decimal {
    if profile.hourly_rate <= Decimal::ZERO || profile.hours_per_week <= Decimal::ZERO {
        debug!(
            hourly_rate = %profile.hourly_rate,
            hours_per_week = %profile.hours_per_week,
            "Profile has no positive wage or schedule; net hourly rate is zero"
        );
        return Decimal::ZERO;
    }

    let charges_per_hour = match profile.hours_per_week.checked_mul(WEEKS_PER_MONTH) {
        Some(monthly_hours) => total_monthly_charges.checked_div(monthly_hours),
        // Monthly hours beyond the decimal range spread any charge to nothing
        None => Some(Decimal::ZERO),
    };

    let Some(charges_per_hour) = charges_per_hour else {
        warn!(
            total_monthly_charges = %total_monthly_charges,
            hours_per_week = %profile.hours_per_week,
            "Charges per hour overflowed; net hourly rate is zero"
        );
        return Decimal::ZERO;
    };

    let net = profile
        .hourly_rate
        .checked_sub(charges_per_hour)
        .unwrap_or(Decimal::MAX);

    if net <= Decimal::ZERO {
        warn!(
            hourly_rate = %profile.hourly_rate,
            charges_per_hour = %charges_per_hour,
            "Monthly charges consume the whole wage; net hourly rate is zero"
        );
        return Decimal::ZERO;
    }

    net
}

/// Hours of work needed to pay for `price` at `net_per_hour`.
pub fn hours_needed(
    price: Decimal,
    net_per_hour: Decimal,
) -> HoursEstimate {
    if net_per_hour <= Decimal::ZERO {
        return HoursEstimate::Unreachable;
    }

    match price.checked_div(net_per_hour) {
        Some(hours) => HoursEstimate::Reachable(hours),
        None => {
            warn!(
                price = %price,
                net_per_hour = %net_per_hour,
                "Hours needed overflowed; treating goal as unreachable"
            );
            HoursEstimate::Unreachable
        }
    }
}

/// Hours still to work after `hours_worked`, never below zero.
pub fn hours_remaining(
    price: Decimal,
    hours_worked: Decimal,
    net_per_hour: Decimal,
) -> HoursEstimate {
    match hours_needed(price, net_per_hour) {
        HoursEstimate::Reachable(needed) => {
            let remaining = needed.checked_sub(hours_worked).unwrap_or_else(|| {
                if hours_worked.is_sign_negative() {
                    Decimal::MAX
                } else {
                    Decimal::ZERO
                }
            });
            HoursEstimate::Reachable(remaining.max(Decimal::ZERO))
        }
        HoursEstimate::Unreachable => HoursEstimate::Unreachable,
    }
}

/// Fraction of the goal already worked, in `[0, 1]`.
///
/// Overshooting the goal is allowed on `hours_worked` but progress saturates
/// at 1. Unreachable or non-positive goals report no progress.
pub fn progress(
    price: Decimal,
    hours_worked: Decimal,
    net_per_hour: Decimal,
) -> Decimal {
    match hours_needed(price, net_per_hour) {
        HoursEstimate::Reachable(needed) if needed > Decimal::ZERO => {
            let fraction = hours_worked.checked_div(needed).unwrap_or_else(|| {
                if hours_worked.is_sign_negative() {
                    Decimal::ZERO
                } else {
                    Decimal::ONE
                }
            });
            clamp_unit(fraction)
        }
        _ => Decimal::ZERO,
    }
}

/// Every derived value for one product, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProgress {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub hours_worked: Decimal,
    pub hours_needed: HoursEstimate,
    pub hours_remaining: HoursEstimate,

    /// Saturates at 1 even when `hours_worked` overshoots.
    pub progress: Decimal,

    /// Long-form motivational message.
    pub message: String,
    /// Short-form status used by cards and the widget.
    pub short_message: String,
}

impl ProductProgress {
    /// Evaluates `product` against a precomputed net hourly rate.
    pub fn evaluate(
        product: &Product,
        net_per_hour: Decimal,
    ) -> Self {
        let remaining = hours_remaining(product.price, product.hours_worked, net_per_hour);

        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            hours_worked: product.hours_worked,
            hours_needed: hours_needed(product.price, net_per_hour),
            hours_remaining: remaining,
            progress: progress(product.price, product.hours_worked, net_per_hour),
            message: long_message(&remaining, &product.name),
            short_message: short_message(&remaining),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.hours_remaining.at_most(Decimal::ZERO)
    }
}
