// Writes the per-postcode summary CSV

use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{OutputRow, CSV_HEADER};
use csv::WriterBuilder;
use std::path::Path;

/// Truncates `output_path` and writes the header followed by `rows` in order.
pub fn write(rows: &[OutputRow], output_path: &Path) -> ScrapeResult<()> {
    let csv_error = |source| ScrapeError::Csv {
        path: output_path.to_path_buf(),
        source,
    };

    // Header is written by hand so an empty batch still gets one
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)
        .map_err(csv_error)?;

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer
        .flush()
        .map_err(|e| ScrapeError::fs(output_path, e))?;

    tracing::debug!(rows = rows.len(), path = %output_path.display(), "Wrote CSV");
    Ok(())
}
