//! Valuation calculations for turning work hours into purchasing progress.
//!
//! [`valuation`] derives the net hourly rate and per-product hour metrics,
//! [`messages`] maps remaining hours to the status text shown to the user.

pub mod common;
pub mod messages;
pub mod valuation;

pub use messages::{format_hours, long_message, short_message};
pub use valuation::{
    HoursEstimate, ProductProgress, hours_needed, hours_remaining, net_hourly_rate, progress,
    total_charges_per_month,
};
