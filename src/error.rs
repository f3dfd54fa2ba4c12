// Error types shared by every stage of the scraping pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    // Missing or malformed config.yaml
    #[error("configuration error: {0}")]
    Config(String),

    // Request could not be sent, or a non-success status in strict mode
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Response body did not have the expected JSON shape
    #[error("unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ScrapeError {
    pub fn parse(url: &str, message: impl Into<String>) -> Self {
        ScrapeError::Parse {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Network and parse failures only spoil the postcode/action batch they
    /// happened in; everything else stops the run.
    pub fn is_batch_local(&self) -> bool {
        matches!(self, ScrapeError::Network { .. } | ScrapeError::Parse { .. })
    }
}

impl From<config::ConfigError> for ScrapeError {
    fn from(error: config::ConfigError) -> Self {
        ScrapeError::Config(error.to_string())
    }
}

// Custom Result type using our error
pub type ScrapeResult<T> = Result<T, ScrapeError>;
