// Downloads a listing's images into its directory as 0.jpg, 1.jpg, ...

use crate::error::{ScrapeError, ScrapeResult};
use crate::http::{FetchMode, FetchedBody, HttpClient};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: usize,
    pub failed: usize,
}

pub fn image_file_name(index: usize) -> String {
    format!("{}.jpg", index)
}

/// Fetches every image in order. A failed image is logged and skipped so the
/// rest of the listing still downloads.
pub async fn download_all(
    client: &HttpClient,
    image_urls: &[String],
    dest_dir: &Path,
    image_base_link: &str,
) -> DownloadReport {
    let mut report = DownloadReport::default();

    for (index, entry) in image_urls.iter().enumerate() {
        // Entries are paths relative to the image host, no URL joining needed
        let url = format!("{}{}", image_base_link, entry);
        let target = dest_dir.join(image_file_name(index));

        match download_one(client, &url, &target).await {
            Ok(bytes) => {
                tracing::debug!(url, bytes, path = %target.display(), "Saved image");
                report.saved += 1;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Image download failed, skipping");
                // Don't leave a truncated file behind
                let _ = tokio::fs::remove_file(&target).await;
                report.failed += 1;
            }
        }
    }

    report
}

async fn download_one(client: &HttpClient, url: &str, target: &Path) -> ScrapeResult<u64> {
    let body = client.fetch(url, FetchMode::Streamed).await?;
    let mut file = File::create(target)
        .await
        .map_err(|e| ScrapeError::fs(target, e))?;

    let mut written = 0u64;
    match body {
        FetchedBody::Streamed(mut response) => {
            while let Some(chunk) = response.chunk().await.map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })? {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ScrapeError::fs(target, e))?;
                written += chunk.len() as u64;
            }
        }
        FetchedBody::Buffered(bytes) => {
            file.write_all(&bytes)
                .await
                .map_err(|e| ScrapeError::fs(target, e))?;
            written = bytes.len() as u64;
        }
    }
    file.flush().await.map_err(|e| ScrapeError::fs(target, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(server: &MockServer, route: &str, body: &'static [u8]) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn writes_files_in_list_order() {
        let server = MockServer::start().await;
        serve(&server, "/img/a.jpg", b"AAA").await;
        serve(&server, "/img/b.jpg", b"BB").await;
        serve(&server, "/img/p.jpg", b"P").await;

        let dir = TempDir::new().expect("temp dir");
        let client = HttpClient::new(false).expect("client");
        let urls = vec!["a.jpg".to_string(), "b.jpg".to_string(), "p.jpg".to_string()];
        let base = format!("{}/img/", server.uri());

        let report = download_all(&client, &urls, dir.path(), &base).await;

        assert_eq!(report, DownloadReport { saved: 3, failed: 0 });
        assert_eq!(std::fs::read(dir.path().join("0.jpg")).unwrap(), b"AAA");
        assert_eq!(std::fs::read(dir.path().join("1.jpg")).unwrap(), b"BB");
        assert_eq!(std::fs::read(dir.path().join("2.jpg")).unwrap(), b"P");
    }

    #[tokio::test]
    async fn failed_image_does_not_stop_the_rest() {
        let server = MockServer::start().await;
        serve(&server, "/ok.jpg", b"OK").await;

        let dir = TempDir::new().expect("temp dir");
        let client = HttpClient::new(true).expect("client");
        // First entry 404s under strict status checking
        let urls = vec!["missing.jpg".to_string(), "ok.jpg".to_string()];
        let base = format!("{}/", server.uri());

        let report = download_all(&client, &urls, dir.path(), &base).await;

        assert_eq!(report, DownloadReport { saved: 1, failed: 1 });
        assert!(!dir.path().join("0.jpg").exists());
        assert_eq!(std::fs::read(dir.path().join("1.jpg")).unwrap(), b"OK");
    }

    #[tokio::test]
    async fn large_image_is_written_whole() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..512 * 1024).map(|i| (i % 251) as u8).collect();
        Mock::given(method("GET"))
            .and(path("/big.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("temp dir");
        let client = HttpClient::new(false).expect("client");
        let urls = vec!["big.jpg".to_string()];
        let base = format!("{}/", server.uri());

        let report = download_all(&client, &urls, dir.path(), &base).await;

        assert_eq!(report, DownloadReport { saved: 1, failed: 0 });
        assert_eq!(std::fs::read(dir.path().join("0.jpg")).unwrap(), body);
    }

    #[tokio::test]
    async fn empty_list_downloads_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let client = HttpClient::new(false).expect("client");
        let report = download_all(&client, &[], dir.path(), "http://unused/").await;
        assert_eq!(report, DownloadReport::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
