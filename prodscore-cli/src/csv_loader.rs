//! CSV loader for monthly charges.
//!
//! ## CSV Format
//!
//! | Column             | Required | Type    | Notes                    |
//! |--------------------|----------|---------|--------------------------|
//! | `name`             | yes      | string  | Must not be blank        |
//! | `amount_per_month` | yes      | decimal | Must be positive; `.` or `,` as separator |
//!
//! Headers are matched by name, so column order does not matter. A decimal
//! comma needs the cell quoted (`"12,50"`).
//!
//! ```csv
//! name,amount_per_month
//! Rent,650.00
//! Phone,19.99
//! ```
//!
//! Every row is validated before anything is returned, so an import either
//! loads the whole file or nothing.

use prodscore_core::input::{ParseAmountError, parse_amount};
use prodscore_core::models::NewCharge;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    amount_per_month: String,
}

/// Errors that can occur while loading charge CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvImportError {
    #[error("could not read CSV file: {0}")]
    Io(#[from] std::io::Error),

    /// Bad structure, missing column, or a cell of the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("invalid amount on row {row}: {source}")]
    InvalidAmount {
        row: usize,
        #[source]
        source: ParseAmountError,
    },

    /// `row` is 1-based, not counting the header.
    #[error("empty charge name on row {row}")]
    EmptyName { row: usize },

    #[error("amount must be positive on row {row}, got {amount}")]
    NonPositiveAmount { amount: Decimal, row: usize },
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<NewCharge, CsvImportError> {
    if row.name.is_empty() {
        return Err(CsvImportError::EmptyName { row: row_number });
    }
    let amount_per_month =
        parse_amount(&row.amount_per_month).map_err(|source| CsvImportError::InvalidAmount {
            row: row_number,
            source,
        })?;
    if amount_per_month <= Decimal::ZERO {
        return Err(CsvImportError::NonPositiveAmount {
            amount: amount_per_month,
            row: row_number,
        });
    }

    Ok(NewCharge {
        name: row.name,
        amount_per_month,
    })
}

/// Parse CSV text and return the charges in file order.
///
/// # Errors
///
/// * [`CsvImportError::Parse`] if the CSV is structurally invalid.
/// * [`CsvImportError::InvalidAmount`], [`CsvImportError::EmptyName`] or
///   [`CsvImportError::NonPositiveAmount`] for the first row that fails
///   validation.
pub fn load_from_str(input: &str) -> Result<Vec<NewCharge>, CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &std::path::Path) -> Result<Vec<NewCharge>, CsvImportError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}
