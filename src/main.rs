use anyhow::Context;
use clap::Parser;
use database::Database;
use reddit_client::{RedditClient, RedditOAuth2Config};
use relay_service::{ConsoleChallengeResolver, Processor};
use relaybot_core::BotConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "relaybot=info,relay_service=info,reddit_client=info,database=info";
const VERBOSE_LOG_FILTER: &str =
    "relaybot=debug,relay_service=debug,reddit_client=debug,database=debug,relaybot_core=debug";

/// Reposts well-scoring links from watched subreddits to destination subreddits.
#[derive(Parser, Debug)]
#[command(name = "relaybot")]
#[command(version, about)]
struct Cli {
    /// SQLite file holding processed items and rejected domains
    #[arg(long, default_value = "bot.db")]
    db: String,

    /// YAML configuration file
    #[arg(long, default_value = "bot.yml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Starting relaybot");

    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config))?;
    let database = Database::open(&cli.db)
        .await
        .with_context(|| format!("failed to open database {}", cli.db))?;
    let client = RedditClient::new(RedditOAuth2Config::from_bot_config(&config))
        .context("failed to build Reddit client")?;

    let mut processor =
        Processor::from_config(&config, client, database, ConsoleChallengeResolver::new());
    let report = processor.run().await;

    println!(
        "Fetched {} items ({} sources failed): {} posts made, {} publish failures, {} ineligible, {} already seen, {} blocked by domain, {} items failed",
        report.fetched,
        report.failed_sources,
        report.published,
        report.failed_publications,
        report.ineligible,
        report.already_seen,
        report.domain_rejected,
        report.failed_items
    );

    processor.into_database().close().await;
    Ok(())
}
