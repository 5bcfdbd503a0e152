//! Layout presets
//!
//! A `Layout` bundles every tunable of the reconstruction pipeline for one
//! kind of document. Presets reproduce the tuned geometry of each endpoint;
//! a JSON file can override any of them without a rebuild.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::assemble::ColumnBand;
use super::cluster::{ExclusionRule, RowPolicy};
use super::extract::LanguageFilter;
use super::fragment::{AnchorScale, Span};
use super::template::TableTemplate;

/// Layout loading errors
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Failed to read layouts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid layouts file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pipeline parameters for one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub scale: AnchorScale,
    #[serde(default)]
    pub language_filter: LanguageFilter,
    /// Merge fragments of a paragraph that share the same raw `y`
    #[serde(default)]
    pub join_paragraph_rows: bool,
    /// Decorative glyph column dropped while merging paragraph rows
    #[serde(default)]
    pub glyph_column: Option<Span>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
    pub rows: RowPolicy,
    /// Reading columns for paragraph output
    #[serde(default)]
    pub columns: Vec<ColumnBand>,
    /// Banded record output instead of plain lines
    #[serde(default)]
    pub table: Option<TableTemplate>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::lines()
    }
}

impl Layout {
    /// Line OCR over pixel-space image detection
    pub fn lines() -> Self {
        Self {
            scale: AnchorScale::Pixel,
            language_filter: LanguageFilter::Disabled,
            join_paragraph_rows: true,
            glyph_column: Some(Span::between(606, 608)),
            exclusions: vec![
                ExclusionRule::region(Span::at_least(800), Span::between(64, 67)),
                ExclusionRule::region(Span::ANY, Span::between(103, 118)),
                ExclusionRule::words_in(Span::ANY, Span::at_most(119), &["·"]),
            ],
            rows: RowPolicy::Bucket { width: 4 },
            columns: Vec::new(),
            table: None,
        }
    }

    /// Reading-order text, one column unless columns are configured
    pub fn paragraph() -> Self {
        Self {
            scale: AnchorScale::Pixel,
            language_filter: LanguageFilter::Disabled,
            join_paragraph_rows: true,
            glyph_column: None,
            exclusions: Vec::new(),
            rows: RowPolicy::Bucket { width: 10 },
            columns: Vec::new(),
            table: None,
        }
    }

    /// Weekly test score sheets submitted as PDF
    pub fn test_sheet() -> Self {
        Self {
            scale: AnchorScale::Normalized,
            language_filter: LanguageFilter::Permissive,
            join_paragraph_rows: true,
            glyph_column: Some(Span::between(606, 608)),
            exclusions: vec![
                ExclusionRule::region(Span::at_least(821), Span::exactly(67)),
                ExclusionRule::region(Span::ANY, Span::between(103, 118)),
                ExclusionRule::words_in(Span::ANY, Span::at_most(119), &["·"]),
            ],
            rows: RowPolicy::Snap {
                cutoff: 120,
                step: 15,
            },
            columns: Vec::new(),
            table: Some(TableTemplate::test_sheet()),
        }
    }
}

/// Parameters for standalone word lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsLayout {
    #[serde(default)]
    pub language_filter: LanguageFilter,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_min_chars() -> usize {
    3
}

impl Default for WordsLayout {
    fn default() -> Self {
        Self {
            language_filter: LanguageFilter::Permissive,
            min_chars: default_min_chars(),
        }
    }
}

/// Layouts for every endpoint
///
/// When deserialized, each endpoint entry is laid over that endpoint's
/// preset: top-level keys it names replace the preset's, the rest are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LayoutOverrides")]
pub struct Layouts {
    pub lines: Layout,
    pub paragraph: Layout,
    pub table: Layout,
    pub words: WordsLayout,
}

impl Default for Layouts {
    fn default() -> Self {
        Self {
            lines: Layout::lines(),
            paragraph: Layout::paragraph(),
            table: Layout::test_sheet(),
            words: WordsLayout::default(),
        }
    }
}

impl Layouts {
    /// Load layouts from a JSON file; settings missing from it keep their presets.
    pub fn from_json_file(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Per-endpoint partial layouts as written in a layouts file
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutOverrides {
    #[serde(default)]
    lines: Option<Map<String, Value>>,
    #[serde(default)]
    paragraph: Option<Map<String, Value>>,
    #[serde(default)]
    table: Option<Map<String, Value>>,
    #[serde(default)]
    words: Option<Map<String, Value>>,
}

impl TryFrom<LayoutOverrides> for Layouts {
    type Error = serde_json::Error;

    fn try_from(overrides: LayoutOverrides) -> Result<Self, Self::Error> {
        Ok(Self {
            lines: overlay(Layout::lines(), overrides.lines)?,
            paragraph: overlay(Layout::paragraph(), overrides.paragraph)?,
            table: overlay(Layout::test_sheet(), overrides.table)?,
            words: overlay(WordsLayout::default(), overrides.words)?,
        })
    }
}

/// Replace the preset's top-level fields with those present in `patch`
fn overlay<T>(preset: T, patch: Option<Map<String, Value>>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let Some(patch) = patch else {
        return Ok(preset);
    };

    let mut merged = match serde_json::to_value(preset)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    merged.extend(patch);
    serde_json::from_value(Value::Object(merged))
}
