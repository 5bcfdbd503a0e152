//! Glyph break normalization
//!
//! Folds a run of glyphs into text, inserting the separator implied by each
//! glyph's detected break.

use serde::{Deserialize, Serialize};

use crate::ocr::{BreakType, Symbol};

/// How detected breaks are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStyle {
    /// Only inter-word spaces are rendered; line-wrap breaks add nothing
    #[default]
    Inline,
    /// Inter-word spaces and line-wrap breaks (as `\n`) are rendered
    LineBreaks,
}

impl BreakStyle {
    /// Separator appended after a glyph with the given break
    pub fn separator(&self, detected: Option<BreakType>) -> &'static str {
        match (self, detected) {
            (_, Some(BreakType::Space)) => " ",
            (BreakStyle::LineBreaks, Some(BreakType::EolSureSpace)) => "\n",
            _ => "",
        }
    }
}

/// Join glyph texts with their break separators
pub fn join_symbols<'a, I>(symbols: I, style: BreakStyle) -> String
where
    I: IntoIterator<Item = &'a Symbol>,
{
    symbols.into_iter().fold(String::new(), |mut text, symbol| {
        text.push_str(&symbol.text);
        text.push_str(style.separator(symbol.break_type()));
        text
    })
}
