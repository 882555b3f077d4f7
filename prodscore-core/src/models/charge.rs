use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recurring monthly cost that eats into effective earnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: i64,
    pub name: String,
    pub amount_per_month: Decimal,
}

/// For creating new charges (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCharge {
    pub name: String,
    pub amount_per_month: Decimal,
}
