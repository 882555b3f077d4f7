//! Motivational status messages keyed on the hours left to work.
//!
//! Bands are checked from the smallest threshold up and the first match wins.
//! An [`HoursEstimate::Unreachable`] goal falls past every threshold.
//!
//! | Remaining | Long form | Short form |
//! |-----------|-----------|------------|
//! | ≤ 0       | Goal reached! | Goal met! |
//! | ≤ 1       | Final push! | Almost there! |
//! | ≤ 4       | Only {h} of work left! | {h} left! |
//! | ≤ 8       | One day and you're done! | {h} left! |
//! | ≤ 16      | Two days max, you've got this! | {h} remaining |
//! | ≤ 40      | A week of hustle! | {h} remaining |
//! | > 40      | {product} arrives soon! | {h} remaining |

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculations::valuation::HoursEstimate;

/// Formats an hour count for display.
///
/// Whole numbers render without decimals, anything else with exactly one
/// decimal digit. Ties round to the even digit, so quarter hours print the
/// way `%.1f` prints them.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use prodscore_core::calculations::format_hours;
///
/// assert_eq!(format_hours(dec!(4)), "4h");
/// assert_eq!(format_hours(dec!(4.00)), "4h");
/// assert_eq!(format_hours(dec!(3.5)), "3.5h");
/// assert_eq!(format_hours(dec!(3.25)), "3.2h");
/// assert_eq!(format_hours(dec!(2.75)), "2.8h");
/// ```
pub fn format_hours(hours: Decimal) -> String {
    if hours.fract().is_zero() {
        return format!("{}h", hours.trunc());
    }
    format!(
        "{:.1}h",
        hours.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
    )
}

/// Long-form message shown on the product detail screen.
pub fn long_message(
    remaining: &HoursEstimate,
    product_name: &str,
) -> String {
    if remaining.at_most(Decimal::ZERO) {
        "Goal reached!".to_string()
    } else if remaining.at_most(Decimal::ONE) {
        "Final push!".to_string()
    } else if let Some(hours) = remaining.hours().filter(|h| *h <= Decimal::from(4)) {
        format!("Only {} of work left!", format_hours(hours))
    } else if remaining.at_most(Decimal::from(8)) {
        "One day and you're done!".to_string()
    } else if remaining.at_most(Decimal::from(16)) {
        "Two days max, you've got this!".to_string()
    } else if remaining.at_most(Decimal::from(40)) {
        "A week of hustle!".to_string()
    } else {
        format!("{product_name} arrives soon!")
    }
}

/// Short-form status used by product cards and the widget.
pub fn short_message(remaining: &HoursEstimate) -> String {
    match remaining {
        HoursEstimate::Reachable(hours) if *hours <= Decimal::ZERO => "Goal met!".to_string(),
        HoursEstimate::Reachable(hours) if *hours <= Decimal::ONE => "Almost there!".to_string(),
        HoursEstimate::Reachable(hours) if *hours <= Decimal::from(8) => {
            format!("{} left!", format_hours(*hours))
        }
        HoursEstimate::Reachable(_) | HoursEstimate::Unreachable => {
            format!("{remaining} remaining")
        }
    }
}
