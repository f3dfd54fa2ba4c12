// Data structures for listings as they come off the wire and as they go into the CSV

use crate::dedup;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column headings of the per-postcode CSV, in output order.
pub const CSV_HEADER: [&str; 7] = [
    "URL",
    "ID",
    "Address",
    "Property type",
    "Number of bedrooms",
    "Price",
    "Features",
];

// Appended after every feature when flattening the list into one cell
pub const FEATURE_SEPARATOR: char = '.';

// One element of the `listings` array, exactly as the search API sends it.
// Field types vary between endpoints (bedrooms as 2, 2.0 or "Studio"), so
// every field is read as text rather than rejecting the whole element.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde(rename = "listingAliasId", alias = "id", default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(rename = "displayAddress", alias = "address", default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bedrooms: Option<String>,
    // Plain number on some endpoints, an object on others
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_features: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub image_urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_image: Option<String>,
}

// Renders any scalar (or nested value) as text, null stays None
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// Keeps the scalar entries of an array as text. Nulls and nested values are
// dropped; anything that isn't an array reads as empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect())
}

/// A scraped property, ready for dedup, download and CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub url: String,
    pub address: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<String>,
    pub price: Option<String>,
    pub features: Vec<String>,
    pub image_urls: Vec<String>,
    pub primary_image: Option<String>,
}

impl Listing {
    /// Returns `None` when the record has no id that can name a directory.
    pub fn from_record(record: ListingRecord, item_base_link: &str) -> Option<Self> {
        let id = record.id.filter(|id| dedup::is_valid_marker_name(id))?;
        Some(Listing {
            url: format!("{}{}", item_base_link, id),
            id,
            address: record.address,
            property_type: record.property_type,
            bedrooms: record.bedrooms,
            price: record.price,
            features: record.key_features,
            image_urls: record.image_urls,
            primary_image: record.primary_image,
        })
    }

    /// Other images first, primary image last. The position in this list is the file name.
    pub fn image_queue(&self) -> Vec<String> {
        let mut queue = self.image_urls.clone();
        if let Some(primary) = &self.primary_image {
            queue.push(primary.clone());
        }
        queue
    }

    pub fn features_text(&self) -> String {
        self.features
            .iter()
            .map(|f| format!("{}{}", f, FEATURE_SEPARATOR))
            .collect()
    }

    pub fn to_row(&self) -> OutputRow {
        OutputRow {
            url: self.url.clone(),
            id: self.id.clone(),
            address: self.address.clone(),
            property_type: self.property_type.clone(),
            bedrooms: self.bedrooms.clone(),
            price: self.price.clone(),
            features: self.features_text(),
        }
    }
}

// Field order must match CSV_HEADER
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OutputRow {
    pub url: String,
    pub id: String,
    pub address: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<String>,
    pub price: Option<String>,
    pub features: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ListingRecord {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn maps_wire_fields() {
        let listing = Listing::from_record(
            record(json!({
                "listingAliasId": "12345",
                "displayAddress": "1 High Street, London",
                "propertyType": "Flat",
                "bedrooms": 2,
                "price": 350000,
                "keyFeatures": ["Garden", "Parking"],
                "imageUrls": ["a.jpg", "b.jpg"],
                "primaryImage": "p.jpg"
            })),
            "https://site/property/",
        )
        .expect("listing");

        assert_eq!(listing.url, "https://site/property/12345");
        assert_eq!(listing.address.as_deref(), Some("1 High Street, London"));
        assert_eq!(listing.bedrooms.as_deref(), Some("2"));
        assert_eq!(listing.price.as_deref(), Some("350000"));
        assert_eq!(listing.features_text(), "Garden.Parking.");
    }

    #[test]
    fn accepts_short_field_names() {
        let listing = Listing::from_record(
            record(json!({ "id": 77, "address": "2 Low Road" })),
            "base/",
        )
        .expect("listing");
        assert_eq!(listing.id, "77");
        assert_eq!(listing.address.as_deref(), Some("2 Low Road"));
    }

    #[test]
    fn missing_optional_fields_are_empty() {
        let listing = Listing::from_record(
            record(json!({ "listingAliasId": "9", "keyFeatures": null })),
            "",
        )
        .expect("listing");
        assert_eq!(listing.bedrooms, None);
        assert_eq!(listing.price, None);
        assert!(listing.features.is_empty());
        assert_eq!(listing.features_text(), "");
        assert!(listing.image_queue().is_empty());
    }

    #[test]
    fn mixed_field_types_are_read_as_text() {
        let rec = record(json!({
            "id": "5",
            "bedrooms": "Studio",
            "propertyType": 7,
            "displayAddress": 10,
            "keyFeatures": ["Garden", null, 3, { "x": 1 }],
            "imageUrls": "not-a-list",
            "primaryImage": null
        }));
        assert_eq!(rec.bedrooms.as_deref(), Some("Studio"));
        assert_eq!(rec.property_type.as_deref(), Some("7"));
        assert_eq!(rec.address.as_deref(), Some("10"));
        assert_eq!(rec.key_features, vec!["Garden", "3"]);
        assert!(rec.image_urls.is_empty());
        assert_eq!(rec.primary_image, None);

        let fractional = record(json!({ "id": "6", "bedrooms": 2.0 }));
        assert_eq!(fractional.bedrooms.as_deref(), Some("2.0"));
    }

    #[test]
    fn object_price_is_kept_as_json_text() {
        let rec = record(json!({ "id": "1", "price": { "amount": 1200 } }));
        assert_eq!(rec.price.as_deref(), Some(r#"{"amount":1200}"#));
    }

    #[test]
    fn primary_image_goes_last() {
        let listing = Listing::from_record(
            record(json!({
                "id": "1",
                "imageUrls": ["A", "B"],
                "primaryImage": "P"
            })),
            "",
        )
        .expect("listing");
        assert_eq!(listing.image_queue(), vec!["A", "B", "P"]);
    }

    #[test]
    fn unusable_ids_are_rejected() {
        assert!(Listing::from_record(record(json!({})), "").is_none());
        assert!(Listing::from_record(record(json!({ "id": "" })), "").is_none());
        assert!(Listing::from_record(record(json!({ "id": "../etc" })), "").is_none());
    }
}
