// Resolves how many results a search has, so the listing query can ask for all of them

use crate::error::{ScrapeError, ScrapeResult};
use crate::http::HttpClient;
use serde_json::Value;

pub async fn resolve_count(client: &HttpClient, count_url: &str) -> ScrapeResult<u64> {
    let body: Value = client.fetch_json(count_url).await?;
    let count = extract_count(&body).map_err(|message| ScrapeError::parse(count_url, message))?;
    tracing::debug!(count_url, count, "Resolved result count");
    Ok(count)
}

// Accepts a JSON integer or a string of digits
fn extract_count(body: &Value) -> Result<u64, String> {
    match body.get("count") {
        None => Err("field `count` is missing".to_string()),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| format!("field `count` is not a non-negative integer: {}", n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("field `count` is not numeric: {:?}", s)),
        Some(other) => Err(format!("field `count` is not numeric: {}", other)),
    }
}
