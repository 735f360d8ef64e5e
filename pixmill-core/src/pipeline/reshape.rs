//! Lossless reshaping between the one-row-per-product table and the
//! one-row-per-image units the runner consumes.

use std::collections::BTreeMap;

use pixmill_model::{CatalogRow, ImageUnit, UnitOutcome};

/// Expand catalog rows into one unit per referenced image.
///
/// The url cell is split on `,` left to right with no trimming, so joining
/// the emitted `input_url`s per row reproduces the original cell byte for
/// byte. A row with an empty cell still yields exactly one unit (with an
/// empty url) so collapsing can rebuild the original shape.
pub fn expand(rows: &[CatalogRow]) -> Vec<ImageUnit> {
    let mut units = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_id = index as u32 + 1;

        for url in row.input_image_urls.split(',') {
            units.push(ImageUnit {
                row_id,
                serial_number: row.serial_number.clone(),
                product_name: row.product_name.clone(),
                input_url: url.to_string(),
                output: UnitOutcome::Pending,
            });
        }
    }

    units
}

/// Regroup resolved units into catalog rows; the exact inverse of
/// [`expand`] on `row_id` and `input_url`.
///
/// Groups are emitted in ascending `row_id` order to restore the original
/// row order; serial number and product name come from the first unit of
/// each group. Zero, one, or many units per row id are all tolerated.
pub fn collapse(units: Vec<ImageUnit>) -> Vec<CatalogRow> {
    let mut groups: BTreeMap<u32, Vec<ImageUnit>> = BTreeMap::new();
    for unit in units {
        groups.entry(unit.row_id).or_default().push(unit);
    }

    groups
        .into_values()
        .map(|group| {
            let input_image_urls = group
                .iter()
                .map(|unit| unit.input_url.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let output_image_urls = group
                .iter()
                .map(|unit| unit.output.as_cell())
                .collect::<Vec<_>>()
                .join(",");

            let first = &group[0];
            CatalogRow {
                serial_number: first.serial_number.clone(),
                product_name: first.product_name.clone(),
                input_image_urls,
                output_image_urls,
            }
        })
        .collect()
}
