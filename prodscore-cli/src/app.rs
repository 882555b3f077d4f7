//! Command handlers. Each returns the text to print so it can be tested
//! without a terminal.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use prodscore_core::calculations::common::{clamp_unit, round_half_up};
use prodscore_core::calculations::{ProductProgress, format_hours};
use prodscore_core::db::{MemoryRepositoryFactory, ProdScoreRepository, RepositoryRegistry};
use prodscore_core::models::NewProduct;
use prodscore_core::tracker::Overview;
use prodscore_core::{Profile, Tracker};
use prodscore_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::info;

use crate::cli::{ChargeCommand, Command, ProductCommand, ProfileCommand, ScoreCommand, WidgetCommand};
use crate::csv_loader;

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

pub async fn run(
    repo: &dyn ProdScoreRepository,
    command: Command,
) -> Result<String> {
    let tracker = Tracker::new(repo);

    match command {
        Command::Onboard {
            hourly_rate,
            hours_per_week,
        } => {
            let profile = tracker
                .complete_onboarding(hourly_rate, hours_per_week)
                .await?;
            let net = tracker.net_per_hour().await?;
            Ok(format_profile(&profile, net))
        }
        Command::Overview => overview(&tracker).await,
        Command::Profile(cmd) => profile(&tracker, cmd).await,
        Command::Charge(cmd) => charge(&tracker, cmd).await,
        Command::Product(cmd) => product(&tracker, cmd).await,
        Command::Widget(cmd) => widget(&tracker, cmd).await,
        Command::Score(cmd) => score(&tracker, cmd).await,
    }
}

async fn overview(tracker: &Tracker<'_>) -> Result<String> {
    let profile = tracker.profile().await?;
    let overview = tracker.overview().await?;
    let selected = tracker.selected_product().await?.map(|p| p.id);

    let mut out = String::new();
    if !profile.onboarding_complete {
        writeln!(out, "Not onboarded yet: run `prodscore onboard <hourly-rate> <hours-per-week>`.")?;
    }
    out.push_str(&format_overview(&overview, selected));
    Ok(out)
}

async fn profile(
    tracker: &Tracker<'_>,
    cmd: ProfileCommand,
) -> Result<String> {
    let profile = match cmd {
        ProfileCommand::Show => tracker.profile().await?,
        ProfileCommand::Set {
            hourly_rate,
            hours_per_week,
        } => tracker.update_profile(hourly_rate, hours_per_week).await?,
        ProfileCommand::ResetOnboarding => tracker.reset_onboarding().await?,
    };
    let net = tracker.net_per_hour().await?;
    Ok(format_profile(&profile, net))
}

async fn charge(
    tracker: &Tracker<'_>,
    cmd: ChargeCommand,
) -> Result<String> {
    match cmd {
        ChargeCommand::Add {
            name,
            amount_per_month,
        } => {
            let charge = tracker.add_charge(&name, amount_per_month).await?;
            Ok(format!(
                "Added charge #{} {}: {}/month",
                charge.id,
                charge.name,
                money(charge.amount_per_month)
            ))
        }
        ChargeCommand::List => {
            let charges = tracker.charges().await?;
            let mut out = String::new();
            for c in &charges {
                writeln!(out, "#{} {}: {}/month", c.id, c.name, money(c.amount_per_month))?;
            }
            write!(out, "Total: {}/month", money(tracker.total_charges_per_month().await?))?;
            Ok(out)
        }
        ChargeCommand::Remove { id } => {
            tracker.remove_charge(id).await?;
            Ok(format!("Removed charge #{id}"))
        }
        ChargeCommand::Import { path } => {
            let charges = csv_loader::load_from_file(&path)
                .with_context(|| format!("Failed to import charges from '{}'", path.display()))?;
            let count = tracker.import_charges(charges).await?.len();
            info!(count, path = %path.display(), "charges imported");
            Ok(format!("Imported {count} charges"))
        }
    }
}

async fn product(
    tracker: &Tracker<'_>,
    cmd: ProductCommand,
) -> Result<String> {
    match cmd {
        ProductCommand::Add {
            name,
            price,
            url,
            image,
        } => {
            let mut new = NewProduct::new(name, price);
            if let Some(url) = url {
                new = new.with_source_url(url);
            }
            if let Some(path) = image {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read image '{}'", path.display()))?;
                new = new.with_image_data(bytes);
            }
            let created = tracker.add_product(new).await?;
            let progress = tracker.progress_for(created.id).await?;
            Ok(format!("Added product #{}\n{}", created.id, format_progress(&progress)))
        }
        ProductCommand::List => {
            let overview = tracker.overview().await?;
            let selected = tracker.selected_product().await?.map(|p| p.id);
            Ok(format_product_list(&overview.products, selected))
        }
        ProductCommand::Show { id } => Ok(format_progress(&tracker.progress_for(id).await?)),
        ProductCommand::Select { id } => {
            let product = tracker.select_product(id).await?;
            Ok(format!("Widget now shows #{} {}", product.id, product.name))
        }
        ProductCommand::AddHours { id, hours } => {
            tracker.add_hours(id, hours).await?;
            Ok(format_progress(&tracker.progress_for(id).await?))
        }
        ProductCommand::Reset { id } => {
            tracker.reset_hours(id).await?;
            Ok(format_progress(&tracker.progress_for(id).await?))
        }
        ProductCommand::Remove { id } => {
            tracker.remove_product(id).await?;
            Ok(format!("Removed product #{id}"))
        }
    }
}

async fn widget(
    tracker: &Tracker<'_>,
    cmd: WidgetCommand,
) -> Result<String> {
    if let WidgetCommand::AddHour { hours } = cmd {
        if tracker.add_hours_to_selected(hours).await?.is_none() {
            return Ok("No product to log hours on".to_string());
        }
    }
    Ok(tracker.widget_entry().await?.to_string())
}

async fn score(
    tracker: &Tracker<'_>,
    cmd: ScoreCommand,
) -> Result<String> {
    let board = match cmd {
        ScoreCommand::Show => tracker.scoreboard().await?,
        ScoreCommand::Up => tracker.adjust_score(1).await?,
        ScoreCommand::Down => tracker.adjust_score(-1).await?,
        ScoreCommand::Reset => tracker.reset_score().await?,
        ScoreCommand::Message { text } => tracker.set_score_message(&text).await?,
    };
    if board.message.is_empty() {
        Ok(format!("Score: {}", board.score))
    } else {
        Ok(format!("Score: {} ({})", board.score, board.message))
    }
}

// ─── formatting ──────────────────────────────────────────────────────────────

/// Two decimal places, half-up.
fn money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value, 2))
}

pub fn format_profile(
    profile: &Profile,
    net_per_hour: Decimal,
) -> String {
    format!(
        "Hourly rate: {}\nHours per week: {}\nOnboarding: {}\nNet per hour: {}",
        money(profile.hourly_rate),
        format_hours(profile.hours_per_week),
        if profile.onboarding_complete { "complete" } else { "pending" },
        money(net_per_hour)
    )
}

pub fn format_progress(p: &ProductProgress) -> String {
    let mut out = format!(
        "{} ({})\n{}\nWorked: {} / {}\nRemaining: {}\nProgress: {}%",
        p.name,
        money(p.price),
        p.message,
        format_hours(p.hours_worked),
        p.hours_needed,
        p.hours_remaining,
        round_half_up(clamp_unit(p.progress) * Decimal::ONE_HUNDRED, 0)
    );
    if !p.hours_needed.is_reachable() {
        out.push_str("\nNet hourly rate is zero: check your wage and charges.");
    }
    out
}

pub fn format_product_list(
    products: &[ProductProgress],
    selected: Option<i64>,
) -> String {
    if products.is_empty() {
        return "No products yet".to_string();
    }
    products
        .iter()
        .map(|p| {
            let marker = if Some(p.product_id) == selected { "*" } else { " " };
            format!(
                "{marker} #{} {} ({}): {} / {}, {}",
                p.product_id,
                p.name,
                money(p.price),
                format_hours(p.hours_worked),
                p.hours_needed,
                p.short_message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_overview(
    overview: &Overview,
    selected: Option<i64>,
) -> String {
    let mut out = format!(
        "Net per hour: {}\nCharges: {}/month\n",
        money(overview.net_per_hour),
        money(overview.total_charges_per_month)
    );
    if !overview.products.is_empty() {
        let met = overview.products.iter().filter(|p| p.is_complete()).count();
        out.push_str(&format!("Goals met: {met} of {}\n", overview.products.len()));
    }
    out.push_str(&format_product_list(&overview.products, selected));
    out
}
