//! Row clustering
//!
//! Snaps each fragment's vertical anchor to a row key so that glyphs with a
//! few pixels of detection jitter land on the same line. Clustering is
//! destructive: every member's `y` is overwritten by its row key, so it must
//! run once per pipeline stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fragment::{PositionedFragment, Span};

/// Row key → members, iterated top to bottom
pub type RowClusters = BTreeMap<u32, Vec<PositionedFragment>>;

/// How a fragment's `y` maps to its row key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RowPolicy {
    /// `floor(y / width) * width`
    Bucket { width: u32 },
    /// Raw `y` below `cutoff`; otherwise nearest multiple of `step`
    Snap { cutoff: u32, step: u32 },
    /// Raw `y`
    Exact,
}

impl RowPolicy {
    pub fn row_key(&self, y: u32) -> u32 {
        match *self {
            RowPolicy::Bucket { width } if width > 0 => y / width * width,
            RowPolicy::Snap { cutoff, step } if step > 0 => {
                if y < cutoff || y % step == 0 {
                    y
                } else {
                    // round half up
                    let (y, step) = (u64::from(y), u64::from(step));
                    ((2 * y + step) / (2 * step) * step) as u32
                }
            }
            _ => y,
        }
    }
}

/// Rectangle (optionally restricted to specific words) whose fragments are
/// discarded before clustering: header stamps, watermarks, stray bullets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    #[serde(default)]
    pub x: Span,
    #[serde(default)]
    pub y: Span,
    /// Only fragments with exactly one of these words match (any word when empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<String>,
}

impl ExclusionRule {
    pub fn region(x: Span, y: Span) -> Self {
        Self {
            x,
            y,
            words: Vec::new(),
        }
    }

    pub fn words_in(x: Span, y: Span, words: &[&str]) -> Self {
        Self {
            x,
            y,
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn matches(&self, fragment: &PositionedFragment) -> bool {
        self.x.contains(fragment.x)
            && self.y.contains(fragment.y)
            && (self.words.is_empty() || self.words.iter().any(|w| *w == fragment.word))
    }
}

/// Drop every fragment matched by any rule
pub fn apply_exclusions(
    fragments: Vec<PositionedFragment>,
    rules: &[ExclusionRule],
) -> Vec<PositionedFragment> {
    if rules.is_empty() {
        return fragments;
    }

    let before = fragments.len();
    let kept: Vec<PositionedFragment> = fragments
        .into_iter()
        .filter(|fragment| !rules.iter().any(|rule| rule.matches(fragment)))
        .collect();

    if kept.len() != before {
        tracing::trace!("Excluded {} fragments", before - kept.len());
    }
    kept
}

/// Group fragments into rows, overwriting each member's `y` with its row key.
///
/// Members keep their input order within a row.
pub fn cluster_rows(fragments: Vec<PositionedFragment>, policy: &RowPolicy) -> RowClusters {
    let mut rows = RowClusters::new();
    for mut fragment in fragments {
        let key = policy.row_key(fragment.y);
        fragment.y = key;
        rows.entry(key).or_default().push(fragment);
    }
    rows
}
