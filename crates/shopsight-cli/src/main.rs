use std::sync::Arc;

use clap::{Parser, Subcommand};
use shopsight_core::load_app_config;
use shopsight_scraper::{run_insights, HttpFetcher, PageFetcher, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopsight-cli")]
#[command(about = "Storefront insights extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a store URL, run the extraction pipeline, and print the
    /// aggregate as pretty JSON.
    Probe {
        /// Store URL (bare domains default to https)
        url: String,
        /// Enable competitor discovery (requires a configured source)
        #[arg(long)]
        competitors: bool,
        /// Override the maximum catalog page count
        #[arg(long)]
        max_pages: Option<usize>,
        /// Override the per-run deadline in seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Probe {
            url,
            competitors,
            max_pages,
            deadline_secs,
        } => {
            let mut options = RunOptions::from_config(&config);
            options.competitor_discovery = competitors;
            if let Some(max_pages) = max_pages {
                options.max_catalog_pages = max_pages;
            }
            if let Some(deadline_secs) = deadline_secs {
                options.run_deadline_secs = deadline_secs;
            }

            let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(
                config.fetch_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_ms,
            )?);

            let (insights, metadata) = run_insights(&url, fetcher, None, &options).await?;
            tracing::info!(
                run_id = %metadata.run_id,
                phase = %metadata.phase,
                total_products = insights.total_products,
                failures = metadata.extractor_failures.len(),
                duration_ms = u64::try_from(metadata.duration.as_millis()).unwrap_or(u64::MAX),
                "probe finished"
            );
            for failure in &metadata.extractor_failures {
                tracing::warn!(failure = %failure, "absorbed extractor failure");
            }
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }
    }

    Ok(())
}
