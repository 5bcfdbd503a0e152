//! Output formatting

use std::collections::HashSet;

use super::assemble::ColumnBand;
use super::fragment::PositionedFragment;

/// Drop repeated entries, keeping the first occurrence of each
pub fn unique(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Concatenate fragments in (y, x) order, starting a new line whenever `y`
/// changes.
pub fn reading_order(fragments: &[PositionedFragment]) -> String {
    let mut ordered: Vec<&PositionedFragment> = fragments.iter().collect();
    ordered.sort_by_key(|fragment| (fragment.y, fragment.x));

    let mut text = String::new();
    let mut previous_y = None;
    for fragment in ordered {
        if previous_y.is_some_and(|y| y != fragment.y) {
            text.push('\n');
        }
        text.push_str(&fragment.word);
        previous_y = Some(fragment.y);
    }
    text
}

/// Reading order for multi-column pages.
///
/// Each column band is rendered top to bottom in turn and columns are
/// separated by a line break. Fragments outside every band are dropped.
/// Without columns the page is treated as a single column.
pub fn reading_columns(fragments: &[PositionedFragment], columns: &[ColumnBand]) -> String {
    if columns.is_empty() {
        return reading_order(fragments);
    }

    columns
        .iter()
        .map(|column| {
            let members: Vec<PositionedFragment> = fragments
                .iter()
                .filter(|fragment| column.contains(fragment.x))
                .cloned()
                .collect();
            reading_order(&members)
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split the provider's already-joined full text into lines
pub fn split_full_text(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
