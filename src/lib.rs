// Property listing scraper: for each configured postcode and search action it
// pulls listings from the search API, downloads their images and writes a CSV.

pub mod config;
pub mod count;
pub mod csv_out;
pub mod dedup;
pub mod error;
pub mod http;
pub mod images;
pub mod links;
pub mod listings;
pub mod models;
pub mod pipeline;

pub use crate::config::Settings;
pub use crate::error::{ScrapeError, ScrapeResult};
pub use crate::http::HttpClient;
pub use crate::pipeline::{BatchSummary, RunSummary, Scraper};
