use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earnings profile entered during onboarding and edited from settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Gross hourly wage, in currency per hour.
    pub hourly_rate: Decimal,
    pub hours_per_week: Decimal,
    pub onboarding_complete: bool,
}

impl Default for Profile {
    /// No wage yet, a 35 hour week, onboarding still pending.
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::ZERO,
            hours_per_week: Decimal::from(35),
            onboarding_complete: false,
        }
    }
}
