//! Shared helpers for the valuation and message modules.

use rust_decimal::{Decimal, RoundingStrategy};

/// Average number of weeks in a month, used to turn a weekly schedule into
/// monthly hours.
pub const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

/// Rounds a decimal value to `dp` decimal places using half-up rounding
/// (midpoints move away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use prodscore_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(3.25), 1), dec!(3.3));
/// assert_eq!(round_half_up(dec!(3.24), 1), dec!(3.2));
/// assert_eq!(round_half_up(dec!(-3.25), 1), dec!(-3.3)); // Away from zero
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value into the closed unit interval `[0, 1]`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use prodscore_core::calculations::common::clamp_unit;
///
/// assert_eq!(clamp_unit(dec!(1.4)), dec!(1));
/// assert_eq!(clamp_unit(dec!(-0.2)), dec!(0));
/// assert_eq!(clamp_unit(dec!(0.25)), dec!(0.25));
/// ```
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
