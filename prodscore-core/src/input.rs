//! Parsing of user-typed amounts (wages, hours, prices, charges).
//!
//! Amounts are entered on decimal keypads that emit either `.` or `,` as the
//! decimal separator, so both are accepted. Thousands separators are not.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

impl ParseAmountError {
    /// The raw text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Trims whitespace and turns a decimal comma into a decimal point.
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', ".")
}

/// Parses a user-typed amount into a [`Decimal`].
///
/// Accepts `,` as decimal separator (e.g. `"12,5"`). Empty or
/// whitespace-only input is treated as 0. Malformed input is logged and
/// returned as an error.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use prodscore_core::input::parse_amount;
///
/// assert_eq!(parse_amount("12,5").unwrap(), dec!(12.5));
/// assert_eq!(parse_amount(" 25 ").unwrap(), dec!(25));
/// assert_eq!(parse_amount("").unwrap(), dec!(0));
/// assert!(parse_amount("abc").is_err());
/// ```
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid amount: {}", e);
        ParseAmountError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses an optional amount.
///
/// Returns `None` for empty input, or when parsing fails (logs a warning on
/// parse failure).
pub fn parse_optional_amount(s: &str) -> Option<Decimal> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                tracing::warn!(input = %s, "invalid optional amount: {}", e);
                None
            },
            Some,
        )
    }
}
