use anyhow::{Context, Result};
use listing_scraper::{HttpClient, Scraper, Settings};
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first so RUST_LOG can live there. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "listing_scraper=info".into())) // Default to info if RUST_LOG not set
        .with(fmt::layer())
        .init();

    // config.yaml and the output tree both live in the directory we're started from
    let working_dir = env::current_dir().context("Failed to resolve working directory")?;

    let settings = match Settings::load(&working_dir) {
        Ok(s) => {
            tracing::info!(
                "Configuration loaded: {} postcodes, {} actions.",
                s.postcodes.len(),
                s.actions.len()
            );
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let client = HttpClient::new(settings.strict_status).context("Failed to build HTTP client")?;

    let summary = Scraper::new(settings, client, working_dir)
        .run()
        .await
        .context("Scrape aborted")?;

    if summary.failed_batches > 0 {
        tracing::warn!("{} batches failed and were skipped.", summary.failed_batches);
    }

    Ok(())
}
