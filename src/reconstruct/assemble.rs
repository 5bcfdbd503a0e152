//! Row assembly
//!
//! Orders the members of each row left to right and joins them, either as a
//! whole line or split into fixed horizontal bands.

use serde::{Deserialize, Serialize};

use super::cluster::RowClusters;
use super::fragment::PositionedFragment;

/// Named closed interval on the x axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub name: String,
    pub min: u32,
    pub max: u32,
}

impl ColumnBand {
    pub fn new(name: &str, min: u32, max: u32) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, x: u32) -> bool {
        self.min <= x && x <= self.max
    }
}

/// Join fragment words left to right; ties keep their input order
pub fn flat_join(fragments: &[PositionedFragment]) -> String {
    let mut ordered: Vec<&PositionedFragment> = fragments.iter().collect();
    ordered.sort_by_key(|fragment| fragment.x);
    ordered.iter().map(|fragment| fragment.word.as_str()).collect()
}

/// One line of text per row, top to bottom
pub fn assemble_lines(rows: &RowClusters) -> Vec<String> {
    rows.values().map(|members| flat_join(members)).collect()
}

/// Join the members falling inside each band; one string per band, in band order.
///
/// Members outside every band are dropped.
pub fn band_fields(row: &[PositionedFragment], bands: &[ColumnBand]) -> Vec<String> {
    bands
        .iter()
        .map(|band| {
            let members: Vec<PositionedFragment> = row
                .iter()
                .filter(|fragment| band.contains(fragment.x))
                .cloned()
                .collect();
            flat_join(&members)
        })
        .collect()
}
