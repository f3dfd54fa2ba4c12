// Fetches the listing array for one search and maps each element into a Listing

use crate::error::{ScrapeError, ScrapeResult};
use crate::http::HttpClient;
use crate::models::{Listing, ListingRecord};
use serde_json::Value;

pub async fn fetch_listings(
    client: &HttpClient,
    listing_url: &str,
    item_base_link: &str,
) -> ScrapeResult<Vec<Listing>> {
    let body: Value = client.fetch_json(listing_url).await?;
    parse_listings(body, listing_url, item_base_link)
}

fn parse_listings(body: Value, listing_url: &str, item_base_link: &str) -> ScrapeResult<Vec<Listing>> {
    let elements = match body {
        Value::Object(mut map) => match map.remove("listings") {
            Some(Value::Array(elements)) => elements,
            Some(_) => return Err(ScrapeError::parse(listing_url, "field `listings` is not an array")),
            None => return Err(ScrapeError::parse(listing_url, "field `listings` is missing")),
        },
        _ => return Err(ScrapeError::parse(listing_url, "response is not a JSON object")),
    };

    let mut listings = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        // A single odd element shouldn't cost the whole batch
        let record: ListingRecord = match serde_json::from_value(element) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping listing with unexpected shape");
                continue;
            }
        };
        let raw_id = record.id.clone();
        match Listing::from_record(record, item_base_link) {
            Some(listing) => listings.push(listing),
            None => tracing::warn!(index, id = ?raw_id, "Skipping listing without a usable id"),
        }
    }
    Ok(listings)
}
