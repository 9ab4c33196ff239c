//! Harvester Entry Point
//!
//! One pipeline operation per invocation, meant to be driven by an
//! external scheduler (cron, systemd timer). Retry policy lives there.
//!
//! - `refresh-session`: mint a fresh upstream session and store it
//! - `harvest`: read the campaign table and index every valid row
//! - `seed-session <ID>`: insert the first session row if none exists

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use platform::client::{HttpClientConfig, build_client};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waves::application::{HarvestAndPersistUseCase, RefreshSessionUseCase};
use waves::domain::{SessionAcquirer, SessionCredential};
use waves::infra::{
    BrowserSessionAcquirer, EsObservationStore, HttpTableExtractor, PgSessionStore,
    ScrapingBeeSessionAcquirer,
};
use waves::{AcquirerConfig, HarvestConfig, ObservationStoreConfig};

/// Buoy observation harvester
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Acquire a fresh session cookie and store it
    RefreshSession,

    /// Extract the campaign table and index its observations
    Harvest,

    /// Insert the initial session row (no-op if one exists)
    SeedSession {
        /// Session id, without the `PHPSESSID=` prefix
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harvester=info,waves=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        tracing::error!(error = %e, "Harvester run failed");
        return Err(e);
    }

    Ok(())
}

async fn run(command: Commands) -> Result<()> {
    let harvest_config = harvest_config_from_env()?;

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(harvest_config.operation_timeout)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    let session_store = Arc::new(PgSessionStore::new(pool));
    let client = build_client(&HttpClientConfig::with_timeout(harvest_config.operation_timeout))?;

    match command {
        Commands::RefreshSession => refresh_session(client, session_store, harvest_config).await,
        Commands::Harvest => harvest(client, session_store, harvest_config).await,
        Commands::SeedSession { id } => {
            let credential = SessionCredential::new(id)?;
            if session_store.seed(&credential).await? {
                tracing::info!("Session store seeded");
            } else {
                tracing::info!("Session store already holds a row, nothing written");
            }
            Ok(())
        }
    }
}

async fn refresh_session(
    client: reqwest::Client,
    session_store: Arc<PgSessionStore>,
    harvest_config: HarvestConfig,
) -> Result<()> {
    let target_url = env::var("TARGET_WEB").unwrap_or_else(|_| harvest_config.campaign_url.clone());

    match env::var("SCRAPINGBEE_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            tracing::info!("Acquiring session through ScrapingBee");
            let acquirer = ScrapingBeeSessionAcquirer::new(client, api_key, target_url);
            run_refresh(acquirer, session_store, harvest_config).await
        }
        _ => {
            let chrome_url = env::var("CHROME_URL").context("CHROME_URL must be set in environment")?;
            let config = AcquirerConfig {
                chrome_url,
                target_url,
            };
            let acquirer = BrowserSessionAcquirer::discover(&client, &config).await?;
            run_refresh(acquirer, session_store, harvest_config).await
        }
    }
}

async fn run_refresh<A>(
    acquirer: A,
    session_store: Arc<PgSessionStore>,
    harvest_config: HarvestConfig,
) -> Result<()>
where
    A: SessionAcquirer + Sync,
{
    let use_case =
        RefreshSessionUseCase::new(Arc::new(acquirer), session_store, Arc::new(harvest_config));
    use_case.execute().await?;
    Ok(())
}

async fn harvest(
    client: reqwest::Client,
    session_store: Arc<PgSessionStore>,
    harvest_config: HarvestConfig,
) -> Result<()> {
    let elasticsearch_url =
        env::var("ELASTICSEARCH_URL").context("ELASTICSEARCH_URL must be set in environment")?;

    let observation_store = EsObservationStore::new(
        client.clone(),
        &ObservationStoreConfig {
            base_url: elasticsearch_url,
        },
    )?;

    let use_case = HarvestAndPersistUseCase::new(
        session_store,
        Arc::new(HttpTableExtractor::new(client)),
        Arc::new(observation_store),
        Arc::new(harvest_config),
    );

    let report = use_case.execute().await?;
    tracing::info!(persisted = report.persisted, "Observations harvested");
    Ok(())
}

fn harvest_config_from_env() -> Result<HarvestConfig> {
    let mut config = HarvestConfig::default();

    if let Ok(campaign_url) = env::var("CAMPAIGN_URL") {
        config.campaign_url = campaign_url;
    }
    if let Ok(collection) = env::var("WAVES_INDEX") {
        config.collection = collection;
    }
    if let Ok(secs) = env::var("HARVEST_TIMEOUT_SECS") {
        let secs: u64 = secs
            .parse()
            .context("HARVEST_TIMEOUT_SECS must be a number of seconds")?;
        config.operation_timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_session() {
        let cli = Cli::try_parse_from(["harvester", "seed-session", "abc123"]).unwrap();
        assert!(matches!(cli.command, Commands::SeedSession { id } if id == "abc123"));
    }

    #[test]
    fn test_parse_refresh_and_harvest() {
        let cli = Cli::try_parse_from(["harvester", "refresh-session"]).unwrap();
        assert!(matches!(cli.command, Commands::RefreshSession));

        let cli = Cli::try_parse_from(["harvester", "harvest"]).unwrap();
        assert!(matches!(cli.command, Commands::Harvest));

        assert!(Cli::try_parse_from(["harvester", "seed-session"]).is_err());
    }
}
