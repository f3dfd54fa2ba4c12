// Drives the postcode x action loop: count, fetch, dedup, download, CSV

use crate::config::{Action, Settings};
use crate::count::resolve_count;
use crate::error::{ScrapeError, ScrapeResult};
use crate::http::HttpClient;
use crate::images::{self, DownloadReport};
use crate::links::SearchLinks;
use crate::listings::fetch_listings;
use crate::{csv_out, dedup};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

// Everything the scraper writes lives under <working dir>/inDATAside
pub const OUTPUT_DIR_NAME: &str = "inDATAside";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub postcode: String,
    pub action: String,
    pub count: u64,
    pub written: usize,
    pub skipped_duplicates: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    pub csv_path: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub batches: Vec<BatchSummary>,
    pub failed_batches: usize,
    pub elapsed: chrono::Duration,
}

// Per-listing work queued for the download pool
struct DownloadJob {
    listing_id: String,
    image_urls: Vec<String>,
    dest_dir: PathBuf,
}

pub struct Scraper {
    settings: Settings,
    client: HttpClient,
    working_dir: PathBuf,
}

impl Scraper {
    pub fn new(settings: Settings, client: HttpClient, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            client,
            working_dir: working_dir.into(),
        }
    }

    /// `<working dir>/inDATAside/<action label>`
    pub fn output_root(&self, action_label: &str) -> PathBuf {
        self.working_dir.join(OUTPUT_DIR_NAME).join(action_label)
    }

    /// Runs every postcode/action batch in order. A batch that hits a network or
    /// parse error is logged and abandoned; filesystem errors end the run.
    pub async fn run(&self) -> ScrapeResult<RunSummary> {
        let started = chrono::Local::now();
        let mut batches = Vec::new();
        let mut failed_batches = 0;

        for postcode in &self.settings.postcodes {
            for action in &self.settings.actions {
                match self.process_batch(postcode, action).await {
                    Ok(summary) => batches.push(summary),
                    Err(e) if e.is_batch_local() => {
                        tracing::error!(postcode, action = %action.label, error = %e, "Batch abandoned");
                        failed_batches += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let elapsed = chrono::Local::now() - started;
        tracing::info!(
            batches = batches.len(),
            failed_batches,
            "Total execution time {}.{:03}s",
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000
        );

        Ok(RunSummary {
            batches,
            failed_batches,
            elapsed,
        })
    }

    pub async fn process_batch(&self, postcode: &str, action: &Action) -> ScrapeResult<BatchSummary> {
        let links = SearchLinks::for_batch(&self.settings, postcode, &action.value);

        let count = resolve_count(&self.client, &links.count_url()).await?;
        tracing::info!(
            "Processing postcode \"{}\", type is \"{}\", found {} properties.",
            postcode,
            action.label.to_lowercase(),
            count
        );

        let listings = fetch_listings(&self.client, &links.listing_url(count), &self.settings.item_base_link).await?;

        let output_root = self.output_root(&action.label);
        tokio::fs::create_dir_all(&output_root)
            .await
            .map_err(|e| ScrapeError::fs(&output_root, e))?;

        let mut rows = Vec::new();
        let mut jobs = Vec::new();
        let mut skipped_duplicates = 0;

        for listing in &listings {
            // Also catches an id repeated within this response, its marker was made above
            if dedup::is_duplicate(&output_root, &listing.id) {
                tracing::info!("Detected duplicated item with ID: {}. Skipping this item.", listing.id);
                skipped_duplicates += 1;
                continue;
            }

            rows.push(listing.to_row());
            let dest_dir = dedup::create_marker(&output_root, &listing.id).await?;
            jobs.push(DownloadJob {
                listing_id: listing.id.clone(),
                image_urls: listing.image_queue(),
                dest_dir,
            });
        }

        // Waits for every download of the batch before the CSV goes out
        let reports = self.download_images(jobs).await;
        let images_saved = reports.iter().map(|r| r.saved).sum();
        let images_failed = reports.iter().map(|r| r.failed).sum();

        let csv_path = csv_path(&output_root, postcode);
        tracing::info!("Generating CSV file for the postcode {}.", postcode);
        csv_out::write(&rows, &csv_path)?;

        Ok(BatchSummary {
            postcode: postcode.to_string(),
            action: action.label.clone(),
            count,
            written: rows.len(),
            skipped_duplicates,
            images_saved,
            images_failed,
            csv_path,
        })
    }

    async fn download_images(&self, jobs: Vec<DownloadJob>) -> Vec<DownloadReport> {
        let image_base_link = self.settings.image_base_link.as_str();
        let client = &self.client;

        stream::iter(jobs)
            .map(|job| async move {
                let report = images::download_all(client, &job.image_urls, &job.dest_dir, image_base_link).await;
                if report.failed > 0 {
                    tracing::warn!(
                        listing_id = %job.listing_id,
                        saved = report.saved,
                        failed = report.failed,
                        "Listing has missing images"
                    );
                }
                report
            })
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await
    }
}

pub fn csv_path(output_root: &Path, postcode: &str) -> PathBuf {
    output_root.join(format!("{}.csv", postcode))
}
