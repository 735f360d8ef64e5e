use serde::{Deserialize, Serialize};

/// Cell value marking an image that has not been processed yet. The on-disk
/// table uses it wherever a unit never received an outcome.
pub const PENDING_SENTINEL: &str = "yet_to_process";

/// One product row of the catalog table.
///
/// `input_image_urls` holds zero or more comma-joined URLs in a single cell;
/// the serde renames pin the exact on-disk header names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "Serial Number")]
    pub serial_number: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Input Image Urls")]
    pub input_image_urls: String,
    /// Empty on submitted tables; tolerated as absent so three-column
    /// inputs still parse.
    #[serde(rename = "Output Image Urls", default)]
    pub output_image_urls: String,
}

/// Outcome of processing a single image unit.
///
/// Success and failure share one plain-text cell in the result table; the
/// tagged form keeps them unambiguous everywhere in memory and collapses to
/// text only at the table-writing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Not yet processed; serializes to [`PENDING_SENTINEL`].
    Pending,
    /// Public reference of the recompressed, re-uploaded image.
    Stored(String),
    /// Human-readable reason the unit failed. Recorded, never retried.
    Failed(String),
}

impl UnitOutcome {
    /// Plain-text cell representation used by the on-disk table format.
    pub fn as_cell(&self) -> &str {
        match self {
            UnitOutcome::Pending => PENDING_SENTINEL,
            UnitOutcome::Stored(url) => url,
            UnitOutcome::Failed(reason) => reason,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, UnitOutcome::Stored(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_))
    }
}

/// The atomic work item: one image reference lifted out of one catalog row.
///
/// `row_id` is the 1-based index of the originating row and is the only link
/// back to it; serial number and product name ride along so collapsing can
/// rebuild the row without the source table. Units are ephemeral and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUnit {
    pub row_id: u32,
    pub serial_number: String,
    pub product_name: String,
    pub input_url: String,
    pub output: UnitOutcome,
}
