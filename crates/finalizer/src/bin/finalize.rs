use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use finalizer::{
    FinalizationCoordinator, FinalizeMode, LeaderboardClient, LeaderboardConfig, PgCoordinator,
    PgStore, spawn_scheduler,
};
use storage::Database;
use storage::services::scoring::RulesetVersion;
use storage::services::season::load_season_standings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pickem-finalize")]
#[command(about = "Golf pick'em tournament finalizer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "RAPIDAPI_KEY", default_value = "")]
    api_key: String,

    #[arg(long, env = "LEADERBOARD_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SCORING_RULESET", default_value = "v2")]
    ruleset: RulesetVersion,

    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 15)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Finalize one tournament (the latest due one by default)
    Finalize {
        #[arg(short, long)]
        tournament: Option<String>,

        /// Recompute results of an already finalized tournament
        #[arg(long, requires = "tournament")]
        force: bool,
    },
    /// Finalize every tournament whose window has passed
    RunDue,
    /// Keep running finalization passes on an interval
    Schedule {
        #[arg(long, env = "FINALIZE_INTERVAL_SECS", default_value_t = 300)]
        interval_secs: u64,
    },
    /// Print season standings
    Season,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "pickem_finalize={},finalizer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    match &cli.command {
        Commands::Season => print_season(&db).await?,
        Commands::Finalize { tournament, force } => {
            let coordinator = build_coordinator(&cli, db)?;
            let mode = if *force {
                FinalizeMode::Force
            } else {
                FinalizeMode::Normal
            };
            let report = match tournament {
                Some(id) => coordinator.finalize_by_id(id, mode, Utc::now()).await?,
                None => coordinator.finalize_latest(Utc::now()).await?,
            };

            tracing::info!("✓ {}", report.message());
            for issue in &report.skipped {
                tracing::warn!("  skipped: {}", issue);
            }
        }
        Commands::RunDue => {
            let coordinator = build_coordinator(&cli, db)?;
            let summary = coordinator.finalize_due(Utc::now()).await?;

            for report in &summary.finalized {
                tracing::info!("  ✓ {}", report.message());
            }
            for failure in &summary.failed {
                tracing::warn!("  ✗ {}: {}", failure.tournament_id, failure.error);
            }
            tracing::info!(
                "Summary: {} finalized, {} not finalized",
                summary.finalized.len(),
                summary.failed.len()
            );
        }
        Commands::Schedule { interval_secs } => {
            if *interval_secs == 0 {
                bail!("--interval-secs must be greater than zero");
            }
            let coordinator = Arc::new(build_coordinator(&cli, db)?);
            tracing::info!("Running finalization every {}s", interval_secs);

            let handle = spawn_scheduler(coordinator, Duration::from_secs(*interval_secs));
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            handle.abort();
            tracing::info!("Scheduler stopped");
        }
    }

    Ok(())
}

fn build_coordinator(cli: &Cli, db: Database) -> anyhow::Result<PgCoordinator> {
    if cli.api_key.is_empty() {
        bail!("RAPIDAPI_KEY (or --api-key) is required to fetch leaderboards");
    }

    let mut config = LeaderboardConfig::new(cli.api_key.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }

    let client = LeaderboardClient::new(config).context("Failed to build leaderboard client")?;
    tracing::info!("Scoring with ruleset {}", cli.ruleset);

    Ok(FinalizationCoordinator::new(
        client,
        PgStore::new(db),
        cli.ruleset.rules(),
    ))
}

async fn print_season(db: &Database) -> anyhow::Result<()> {
    let standings = load_season_standings(db.pool())
        .await
        .context("Failed to load season standings")?;

    if standings.is_empty() {
        tracing::warn!("No users found");
        return Ok(());
    }

    for standing in standings {
        tracing::info!(
            "{:>3}. {:<24} {:>4} pts ({} tournaments)",
            standing.rank,
            standing.display_name,
            standing.total_points,
            standing.tournaments_scored
        );
    }

    Ok(())
}
