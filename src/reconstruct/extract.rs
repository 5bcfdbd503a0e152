//! Symbol extraction
//!
//! Walks the page → block → paragraph → word → symbol hierarchy and turns
//! every word that survives language filtering into a positioned fragment.
//! Missing levels anywhere in the hierarchy simply produce nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::breaks::{join_symbols, BreakStyle};
use super::fragment::{AnchorScale, PositionedFragment, Span};
use super::layout::{Layout, WordsLayout};
use crate::ocr::{Block, Page, Paragraph, Symbol, Word};

/// Policy for keeping glyphs by detected language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFilter {
    /// Keep every glyph
    Disabled,
    /// Keep glyphs tagged with the language, or carrying no tags at all
    #[default]
    Permissive,
    /// Keep only glyphs tagged with the language
    Strict,
}

impl LanguageFilter {
    pub fn accepts(&self, symbol: &Symbol, language: &str) -> bool {
        match self {
            LanguageFilter::Disabled => true,
            LanguageFilter::Permissive => {
                let mut languages = symbol.languages().peekable();
                languages.peek().is_none() || languages.any(|code| code == language)
            }
            LanguageFilter::Strict => symbol.languages().any(|code| code == language),
        }
    }
}

/// Extract fragments from every block of every page
pub fn extract_fragments(pages: &[Page], layout: &Layout, language: &str) -> Vec<PositionedFragment> {
    pages
        .iter()
        .filter_map(|page| page.blocks.as_deref())
        .flatten()
        .filter_map(|block| block_fragments(block, layout, language))
        .flatten()
        .collect()
}

/// Fragments of one block, or `None` when the block produced nothing
pub fn block_fragments(
    block: &Block,
    layout: &Layout,
    language: &str,
) -> Option<Vec<PositionedFragment>> {
    let fragments: Vec<PositionedFragment> = block
        .paragraphs
        .iter()
        .flatten()
        .filter_map(|paragraph| paragraph_fragments(paragraph, layout, language))
        .flatten()
        .collect();

    (!fragments.is_empty()).then_some(fragments)
}

fn paragraph_fragments(
    paragraph: &Paragraph,
    layout: &Layout,
    language: &str,
) -> Option<Vec<PositionedFragment>> {
    let fragments: Vec<PositionedFragment> = paragraph
        .words
        .iter()
        .flatten()
        .filter_map(|word| word_fragment(word, layout.scale, layout.language_filter, language))
        .collect();

    if fragments.is_empty() {
        return None;
    }

    if layout.join_paragraph_rows {
        Some(join_rows(fragments, layout.glyph_column))
    } else {
        Some(fragments)
    }
}

/// Turn one word into a fragment.
///
/// The anchor comes from the word's polygon, falling back to the union of its
/// kept glyph polygons, then to the unpositioned sentinel.
pub fn word_fragment(
    word: &Word,
    scale: AnchorScale,
    filter: LanguageFilter,
    language: &str,
) -> Option<PositionedFragment> {
    let symbols = kept_symbols(word, filter, language)?;

    let text = join_symbols(symbols.iter().copied(), BreakStyle::Inline);
    let fragment = word
        .bounding_box
        .as_ref()
        .and_then(|poly| scale.anchor(poly))
        .or_else(|| glyph_anchor(&symbols, scale))
        .map(|(x, y)| PositionedFragment::new(x, y, text.clone()))
        .unwrap_or_else(|| PositionedFragment::unpositioned(text));

    Some(fragment)
}

fn kept_symbols<'a>(word: &'a Word, filter: LanguageFilter, language: &str) -> Option<Vec<&'a Symbol>> {
    let symbols: Vec<&Symbol> = word
        .symbols
        .as_deref()?
        .iter()
        .filter(|symbol| filter.accepts(symbol, language))
        .collect();

    (!symbols.is_empty()).then_some(symbols)
}

fn glyph_anchor(symbols: &[&Symbol], scale: AnchorScale) -> Option<(u32, u32)> {
    symbols
        .iter()
        .filter_map(|symbol| symbol.bounding_box.as_ref())
        .filter_map(|poly| scale.anchor(poly))
        .reduce(|(ax, ay), (bx, by)| (ax.min(bx), ay.min(by)))
}

/// Merge fragments of one paragraph that share the exact same `y`.
///
/// In a group of more than one fragment, members inside `glyph_column` are
/// dropped before joining. The merged fragment takes the smallest remaining
/// `x`; a group emptied by the column filter produces nothing.
pub fn join_rows(
    fragments: Vec<PositionedFragment>,
    glyph_column: Option<Span>,
) -> Vec<PositionedFragment> {
    let mut rows: BTreeMap<u32, Vec<PositionedFragment>> = BTreeMap::new();
    for fragment in fragments {
        rows.entry(fragment.y).or_default().push(fragment);
    }

    rows.into_iter()
        .filter_map(|(y, mut members)| {
            if let Some(column) = glyph_column.filter(|_| members.len() > 1) {
                members.retain(|member| !column.contains(member.x));
            }
            members.sort_by_key(|member| member.x);

            let x = members.first()?.x;
            let word: String = members.iter().map(|member| member.word.as_str()).collect();
            Some(PositionedFragment::new(x, y, word))
        })
        .collect()
}

/// Extract standalone alphabetic words (word list output).
///
/// Glyphs are joined with line breaks rendered, trimmed, and kept only when
/// the result is ASCII alphabetic and at least `min_chars` long.
pub fn extract_words(pages: &[Page], layout: &WordsLayout, language: &str) -> Vec<String> {
    pages
        .iter()
        .filter_map(|page| page.blocks.as_deref())
        .flatten()
        .filter_map(|block| block.paragraphs.as_deref())
        .flatten()
        .filter_map(|paragraph| paragraph.words.as_deref())
        .flatten()
        .filter_map(|word| kept_symbols(word, layout.language_filter, language))
        .map(|symbols| {
            join_symbols(symbols, BreakStyle::LineBreaks)
                .trim()
                .to_string()
        })
        .filter(|text| {
            text.chars().count() >= layout.min_chars
                && text.chars().all(|c| c.is_ascii_alphabetic())
        })
        .collect()
}
