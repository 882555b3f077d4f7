use std::str::FromStr;

use prodscore_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row.
///
/// Amounts are written as TEXT, but INTEGER and REAL values are accepted too
/// so hand-edited databases still load. NULL reads as zero.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    // A NULL reports the declared column type, not "NULL".
    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            Decimal::from_str(val.trim()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Invalid decimal '{}' in column '{}': {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Text form written to SQLite. Trailing zeros are kept.
pub fn decimal_to_text(d: Decimal) -> String {
    d.to_string()
}
