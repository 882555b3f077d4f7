use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use prodscore_cli::app;
use prodscore_cli::cli::Cli;
use prodscore_core::db::DbConfig;

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `warn` so command output stays readable.
/// * Logs go to stderr; command output goes to stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let db_config = DbConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry.create(&db_config).await?;

    let output = app::run(&*repo, cli.command).await?;
    println!("{output}");

    Ok(())
}
