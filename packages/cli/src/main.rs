use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use judge_api::SearchFilter;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mirror_server::config::{AppConfig, DatabaseConfig};
use mirror_server::database::{init_db, reset_schema};
use mirror_server::sync::Synchronizer;

/// Maintenance commands for the AOJ submission mirror.
///
/// Reads the same configuration as the server (`MIRROR_CONFIG`,
/// `MIRROR__*` environment variables).
#[derive(Parser, Debug)]
#[command(name = "aoj-mirror", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop all mirrored submissions and recreate the table.
    Reset,
    /// Mirror one page of submissions from the judge API.
    Sync(SyncArgs),
    /// Reset, then seed the mirror with one problem's submissions.
    Init {
        #[arg(long, env = "MIRROR_INIT_PROBLEM")]
        problem: String,
        #[arg(long, default_value_t = 1000)]
        size: u64,
    },
}

#[derive(Args, Debug)]
struct SyncArgs {
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    problem: Option<String>,
    #[arg(long)]
    language: Option<String>,
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: u64,
    #[arg(long, default_value_t = 100)]
    size: u64,
}

impl SyncArgs {
    fn filter(&self) -> SearchFilter {
        let mut filter = SearchFilter::new(self.page, self.size);
        if let Some(user) = &self.user {
            filter = filter.with_user(user);
        }
        if let Some(problem) = &self.problem {
            filter = filter.with_problem(problem);
        }
        if let Some(language) = &self.language {
            filter = filter.with_language(language);
        }
        filter
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load config")?;

    match cli.command {
        Command::Reset => {
            let db = connect(&config.database).await?;
            reset_schema(&db).await.context("Failed to reset schema")?;
            info!("Submission table recreated");
            db.close().await?;
        }
        Command::Sync(args) => {
            let filter = args.filter();
            anyhow::ensure!(
                !filter.is_unfiltered(),
                "sync needs at least one of --user, --problem, --language"
            );
            anyhow::ensure!(filter.page_size > 0, "--size must be positive");

            let db = init_db(&config.database)
                .await
                .context("Failed to initialize database")?;
            run_sync(&config, &db, &filter).await?;
            db.close().await?;
        }
        Command::Init { problem, size } => {
            anyhow::ensure!(size > 0, "--size must be positive");

            let db = connect(&config.database).await?;
            reset_schema(&db).await.context("Failed to reset schema")?;
            info!("Submission table recreated");

            let filter = SearchFilter::new(0, size).with_problem(&problem);
            run_sync(&config, &db, &filter).await?;
            db.close().await?;
        }
    }

    Ok(())
}

/// Connect without touching the schema; `reset_schema` rebuilds it.
async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(config.connection_url());
    opt.max_connections(1).sqlx_logging(config.sqlx_logging);
    Database::connect(opt)
        .await
        .context("Failed to connect to database")
}

async fn run_sync(
    config: &AppConfig,
    db: &DatabaseConnection,
    filter: &SearchFilter,
) -> anyhow::Result<()> {
    let synchronizer =
        Synchronizer::from_config(&config.upstream).context("Invalid upstream config")?;
    let report = synchronizer
        .sync(db, filter)
        .await
        .context("Synchronization failed")?;

    info!(
        fetched = report.fetched,
        inserted = report.inserted,
        "Sync finished"
    );
    Ok(())
}
