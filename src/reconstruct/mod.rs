//! Line Reconstruction
//!
//! Rebuilds visual lines, columns and table rows from the positioned glyphs
//! returned by the OCR provider.
//!
//! Pipeline:
//!
//! 1. `extract`: symbols → positioned fragments (language filter, break
//!    normalization, optional intra-paragraph row merge)
//! 2. `cluster`: exclusion rules, then row keys by offset policy
//! 3. `assemble` / `template`: x ordering, flat or banded joins
//! 4. `format`: line lists, reading-order text, delimited records
//!
//! Every stage treats missing input as "nothing to produce"; none of them fail.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vision_lines_server::reconstruct::{reconstruct_lines, Layout};
//!
//! let lines = reconstruct_lines(response.pages().unwrap_or_default(), &Layout::lines(), "ja");
//! ```

pub mod assemble;
pub mod breaks;
pub mod cluster;
pub mod extract;
pub mod format;
pub mod fragment;
pub mod layout;
pub mod template;

pub use assemble::ColumnBand;
pub use breaks::BreakStyle;
pub use cluster::{ExclusionRule, RowClusters, RowPolicy};
pub use extract::LanguageFilter;
pub use fragment::{AnchorScale, PositionedFragment, Span, UNPOSITIONED};
pub use layout::{Layout, LayoutError, Layouts, WordsLayout};
pub use template::TableTemplate;

use crate::ocr::Page;

/// Extracted fragments with the layout's exclusion rules applied
pub fn page_fragments(pages: &[Page], layout: &Layout, language: &str) -> Vec<PositionedFragment> {
    let fragments = extract::extract_fragments(pages, layout, language);
    let unpositioned = fragments.iter().filter(|f| !f.is_positioned()).count();
    if unpositioned > 0 {
        tracing::debug!("{} fragments have no geometry", unpositioned);
    }
    cluster::apply_exclusions(fragments, &layout.exclusions)
}

/// Lines (or delimited records, for table layouts) in top-to-bottom order
pub fn reconstruct_lines(pages: &[Page], layout: &Layout, language: &str) -> Vec<String> {
    let fragments = page_fragments(pages, layout, language);
    tracing::debug!("Reconstructing {} fragments", fragments.len());

    match &layout.table {
        Some(template) => template.assemble(fragments, &layout.rows),
        None => assemble::assemble_lines(&cluster::cluster_rows(fragments, &layout.rows)),
    }
}

/// Single text block in reading order
pub fn reconstruct_paragraph(pages: &[Page], layout: &Layout, language: &str) -> String {
    let fragments = page_fragments(pages, layout, language);
    let clustered: Vec<PositionedFragment> = cluster::cluster_rows(fragments, &layout.rows)
        .into_values()
        .flatten()
        .collect();

    format::reading_columns(&clustered, &layout.columns)
}

/// Distinct alphabetic words
pub fn reconstruct_words(pages: &[Page], layout: &WordsLayout, language: &str) -> Vec<String> {
    format::unique(extract::extract_words(pages, layout, language))
}
