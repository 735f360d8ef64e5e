//! CSV catalog codec.
//!
//! The url cells hold comma-joined sub-lists, so cells routinely contain the
//! field delimiter and depend on RFC-4180 quoting to round-trip.

use pixmill_model::CatalogRow;

use crate::error::{PipelineError, Result};

/// Parse a catalog table from raw CSV bytes.
pub fn read_catalog(bytes: &[u8]) -> Result<Vec<CatalogRow>> {
    let mut reader = csv::Reader::from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }

    Ok(rows)
}

/// Render catalog rows back to CSV bytes under the canonical header.
pub fn write_catalog(rows: &[CatalogRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Internal(format!("failed to flush table: {e}")))
}
