// Thin wrapper over reqwest used by every request the scraper makes

use crate::error::{ScrapeError, ScrapeResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

// Desktop browser identity, keeps the API from rejecting obvious bots
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Read the whole body before returning
    Buffered,
    /// Return as soon as headers arrive; the caller pulls the body in chunks
    Streamed,
}

#[derive(Debug)]
pub enum FetchedBody {
    Buffered(Vec<u8>),
    Streamed(Response),
}

impl FetchedBody {
    /// Drains whatever is left of the body into memory.
    pub async fn into_bytes(self, url: &str) -> ScrapeResult<Vec<u8>> {
        match self {
            FetchedBody::Buffered(bytes) => Ok(bytes),
            FetchedBody::Streamed(response) => {
                let body = response.bytes().await.map_err(network_error(url))?;
                Ok(body.to_vec())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    strict_status: bool,
}

fn network_error(url: &str) -> impl FnOnce(reqwest::Error) -> ScrapeError {
    let url = url.to_string();
    move |source| ScrapeError::Network { url, source }
}

impl HttpClient {
    /// Builds the shared client. With `strict_status` off, error pages are
    /// handed back like any other body.
    pub fn new(strict_status: bool) -> ScrapeResult<Self> {
        let inner = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(network_error("<client builder>"))?;
        Ok(Self {
            inner,
            strict_status,
        })
    }

    pub async fn fetch(&self, url: &str, mode: FetchMode) -> ScrapeResult<FetchedBody> {
        let response = self.send(url).await?;
        match mode {
            FetchMode::Streamed => Ok(FetchedBody::Streamed(response)),
            FetchMode::Buffered => {
                let body = response.bytes().await.map_err(network_error(url))?;
                Ok(FetchedBody::Buffered(body.to_vec()))
            }
        }
    }

    /// Buffered GET decoded as JSON. Decode failures surface as parse errors.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> ScrapeResult<T> {
        let body = self
            .fetch(url, FetchMode::Buffered)
            .await?
            .into_bytes(url)
            .await?;
        serde_json::from_slice(&body)
            .map_err(|e| ScrapeError::parse(url, format!("invalid JSON: {}", e)))
    }

    async fn send(&self, url: &str) -> ScrapeResult<Response> {
        tracing::debug!(url, "GET");
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(network_error(url))?;

        if self.strict_status {
            return response.error_for_status().map_err(network_error(url));
        }
        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "Non-success status ignored");
        }
        Ok(response)
    }
}
