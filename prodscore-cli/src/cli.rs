use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prodscore_core::input::parse_amount;
use rust_decimal::Decimal;

/// Accepts `12.5` as well as `12,5`.
fn amount(s: &str) -> Result<Decimal, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Turns prices into the hours of work they cost.
///
/// Stores your wage, monthly charges, and the products you are saving for,
/// then tells you how many hours each product is still worth.
#[derive(Debug, Parser)]
#[command(name = "prodscore", version)]
pub struct Cli {
    /// Storage backend to use.
    #[arg(long, default_value = "sqlite")]
    pub backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `prodscore.db`) or `:memory:`.
    #[arg(long, default_value = "prodscore.db")]
    pub db: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter your hourly wage and weekly hours.
    Onboard {
        #[arg(value_parser = amount)]
        hourly_rate: Decimal,
        #[arg(value_parser = amount)]
        hours_per_week: Decimal,
    },

    /// Net rate, charges, and every product at a glance.
    Overview,

    #[command(subcommand)]
    Profile(ProfileCommand),

    #[command(subcommand)]
    Charge(ChargeCommand),

    #[command(subcommand)]
    Product(ProductCommand),

    #[command(subcommand)]
    Widget(WidgetCommand),

    #[command(subcommand)]
    Score(ScoreCommand),
}

/// Wage settings.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    /// Change wage and weekly hours.
    #[command(allow_negative_numbers = true)]
    Set {
        #[arg(value_parser = amount)]
        hourly_rate: Decimal,
        #[arg(value_parser = amount)]
        hours_per_week: Decimal,
    },
    /// Mark onboarding as not done. Wage values are kept.
    ResetOnboarding,
}

/// Recurring monthly charges.
#[derive(Debug, Subcommand)]
pub enum ChargeCommand {
    Add {
        name: String,
        #[arg(value_parser = amount)]
        amount_per_month: Decimal,
    },
    List,
    Remove {
        id: i64,
    },
    /// Add every charge from a `name,amount_per_month` CSV file.
    Import {
        path: PathBuf,
    },
}

/// Products you are working toward.
#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    Add {
        name: String,
        #[arg(value_parser = amount)]
        price: Decimal,
        /// Shop page the product came from.
        #[arg(long)]
        url: Option<String>,
        /// Image file to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    List,
    Show {
        id: i64,
    },
    /// Show this product in the widget.
    Select {
        id: i64,
    },
    AddHours {
        id: i64,
        #[arg(value_parser = amount, default_value = "1")]
        hours: Decimal,
    },
    /// Set hours worked back to zero.
    Reset {
        id: i64,
    },
    Remove {
        id: i64,
    },
}

/// Home-screen widget.
#[derive(Debug, Subcommand)]
pub enum WidgetCommand {
    Show,
    /// Log hours on the product the widget shows.
    AddHour {
        #[arg(long, value_parser = amount, default_value = "1")]
        hours: Decimal,
    },
}

/// Free-running score counter.
#[derive(Debug, Subcommand)]
pub enum ScoreCommand {
    Show,
    Up,
    Down,
    Reset,
    Message {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_sqlite_file() {
        let cli = Cli::try_parse_from(["prodscore", "overview"]).unwrap();

        assert_eq!(cli.backend, "sqlite");
        assert_eq!(cli.db, "prodscore.db");
    }

    #[test]
    fn profile_set_accepts_negative_values() {
        let cli = Cli::try_parse_from(["prodscore", "profile", "set", "-4", "20"]).unwrap();

        match cli.command {
            Command::Profile(ProfileCommand::Set {
                hourly_rate,
                hours_per_week,
            }) => {
                assert_eq!(hourly_rate, dec!(-4));
                assert_eq!(hours_per_week, dec!(20));
            }
            other => panic!("expected profile set, got {:?}", other),
        }
    }

    #[test]
    fn amounts_accept_decimal_comma() {
        let cli = Cli::try_parse_from(["prodscore", "onboard", "18,5", "35"]).unwrap();

        match cli.command {
            Command::Onboard {
                hourly_rate,
                hours_per_week,
            } => {
                assert_eq!(hourly_rate, dec!(18.5));
                assert_eq!(hours_per_week, dec!(35));
            }
            other => panic!("expected Onboard, got {other:?}"),
        }
    }

    #[test]
    fn add_hours_defaults_to_one() {
        let cli = Cli::try_parse_from(["prodscore", "product", "add-hours", "3"]).unwrap();

        match cli.command {
            Command::Product(ProductCommand::AddHours { id, hours }) => {
                assert_eq!(id, 3);
                assert_eq!(hours, dec!(1));
            }
            other => panic!("expected AddHours, got {other:?}"),
        }
    }

    #[test]
    fn invalid_amount_is_rejected() {
        let result = Cli::try_parse_from(["prodscore", "charge", "add", "Rent", "lots"]);

        assert!(result.is_err());
    }
}
