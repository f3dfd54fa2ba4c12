// Listing directories double as "already processed" markers across runs.
// A marker is never removed, and its presence is the only dedup signal.

use crate::error::{ScrapeError, ScrapeResult};
use std::path::{Component, Path, PathBuf};

pub fn marker_path(output_root: &Path, listing_id: &str) -> PathBuf {
    output_root.join(listing_id)
}

pub fn is_duplicate(output_root: &Path, listing_id: &str) -> bool {
    marker_path(output_root, listing_id).is_dir()
}

/// Creates the listing directory, which both receives the images and marks the
/// listing as done for later runs.
pub async fn create_marker(output_root: &Path, listing_id: &str) -> ScrapeResult<PathBuf> {
    let dir = marker_path(output_root, listing_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ScrapeError::fs(&dir, e))?;
    Ok(dir)
}

/// True when `id` is exactly one ordinary path component, so joining it onto
/// the output root can't escape it.
pub fn is_valid_marker_name(id: &str) -> bool {
    if id.is_empty() || id.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
