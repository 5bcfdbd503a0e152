//! Structured table rows
//!
//! Turns a fixed-geometry score sheet into delimited records: header anchors
//! (session number, subject) are captured and removed up front, rows are
//! snapped, each row is split into column bands, and a record is rendered
//! from anchors, literals and bands in a fixed field order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::assemble::{band_fields, flat_join, ColumnBand};
use super::cluster::{cluster_rows, RowPolicy};
use super::fragment::{PositionedFragment, Span};

/// Locates a single header fragment used as a record-wide value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRule {
    pub name: String,
    #[serde(default)]
    pub x: Span,
    #[serde(default)]
    pub y: Span,
}

/// How an anchor's text is cut down before it enters a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorTransform {
    #[default]
    Whole,
    /// Last `chars` characters
    Tail { chars: usize },
    /// First run of ASCII digits after `prefix`
    DigitsAfter { prefix: String },
}

impl AnchorTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            AnchorTransform::Whole => text.to_string(),
            AnchorTransform::Tail { chars } => {
                let skip = text.chars().count().saturating_sub(*chars);
                text.chars().skip(skip).collect()
            }
            AnchorTransform::DigitsAfter { prefix } => text
                .find(prefix.as_str())
                .map(|at| {
                    text[at + prefix.len()..]
                        .chars()
                        .skip_while(|c| !c.is_ascii_digit())
                        .take_while(|c| c.is_ascii_digit())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Take one piece of a band after splitting on a delimiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub delimiter: String,
    pub index: usize,
}

/// One field of the output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Field {
    Anchor {
        name: String,
        #[serde(default)]
        transform: AnchorTransform,
    },
    Literal {
        value: String,
    },
    Band {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        split: Option<Split>,
        /// Rewrite as a hyphenated question index
        #[serde(default)]
        question_index: bool,
    },
}

/// Full description of a banded table layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTemplate {
    #[serde(default)]
    pub anchors: Vec<AnchorRule>,
    /// Rows keyed below this value are emitted as plain joined lines
    #[serde(default)]
    pub header_below: Option<u32>,
    pub bands: Vec<ColumnBand>,
    pub fields: Vec<Field>,
    /// Marker strings removed from every record
    #[serde(default)]
    pub strip: Vec<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    "|".to_string()
}

/// Captured header fragments by anchor name
pub type Anchors = HashMap<String, PositionedFragment>;

impl TableTemplate {
    /// Weekly test score sheet
    pub fn test_sheet() -> Self {
        Self {
            anchors: vec![
                AnchorRule {
                    name: "session".to_string(),
                    x: Span::ANY,
                    y: Span::exactly(30),
                },
                AnchorRule {
                    name: "subject".to_string(),
                    x: Span::at_least(140),
                    y: Span::between(64, 65),
                },
            ],
            header_below: Some(120),
            bands: vec![
                ColumnBand::new("question", 80, 200),
                ColumnBand::new("content", 220, 600),
                ColumnBand::new("rate", 620, 660),
            ],
            fields: vec![
                Field::Anchor {
                    name: "subject".to_string(),
                    transform: AnchorTransform::Tail { chars: 2 },
                },
                Field::Anchor {
                    name: "session".to_string(),
                    transform: AnchorTransform::Tail { chars: 4 },
                },
                Field::Literal {
                    value: "週テスト".to_string(),
                },
                Field::Band {
                    name: "content".to_string(),
                    split: Some(Split {
                        delimiter: "・".to_string(),
                        index: 0,
                    }),
                    question_index: false,
                },
                Field::Band {
                    name: "content".to_string(),
                    split: Some(Split {
                        delimiter: "・".to_string(),
                        index: 1,
                    }),
                    question_index: false,
                },
                Field::Band {
                    name: "rate".to_string(),
                    split: None,
                    question_index: false,
                },
                Field::Band {
                    name: "question".to_string(),
                    split: None,
                    question_index: true,
                },
            ],
            strip: vec!["【復習】".to_string()],
            delimiter: default_delimiter(),
        }
    }

    /// Capture the first fragment matching each anchor rule, then remove every
    /// fragment identical to a captured one.
    pub fn capture_anchors(&self, fragments: &mut Vec<PositionedFragment>) -> Anchors {
        let anchors: Anchors = self
            .anchors
            .iter()
            .filter_map(|rule| {
                fragments
                    .iter()
                    .find(|f| rule.x.contains(f.x) && rule.y.contains(f.y))
                    .map(|f| (rule.name.clone(), f.clone()))
            })
            .collect();

        fragments.retain(|f| !anchors.values().any(|anchor| anchor == f));
        anchors
    }

    /// Render one banded row, or `None` when every band is blank
    pub fn render_row(&self, row: &[PositionedFragment], anchors: &Anchors) -> Option<String> {
        let fields = band_fields(row, &self.bands);
        if fields.iter().all(|field| field.trim().is_empty()) {
            return None;
        }

        let bands: HashMap<&str, &str> = self
            .bands
            .iter()
            .map(|band| band.name.as_str())
            .zip(fields.iter().map(String::as_str))
            .collect();

        let values: Vec<String> = self
            .fields
            .iter()
            .map(|field| match field {
                Field::Anchor { name, transform } => anchors
                    .get(name)
                    .map(|anchor| transform.apply(&anchor.word))
                    .unwrap_or_default(),
                Field::Literal { value } => value.clone(),
                Field::Band {
                    name,
                    split,
                    question_index,
                } => {
                    let text = bands.get(name.as_str()).copied().unwrap_or_default();
                    let text = match split {
                        Some(split) => text
                            .split(split.delimiter.as_str())
                            .nth(split.index)
                            .unwrap_or_default(),
                        None => text,
                    };
                    if *question_index {
                        normalize_question_index(text)
                    } else {
                        text.to_string()
                    }
                }
            })
            .collect();

        let mut record: String = values
            .join(&self.delimiter)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        for marker in &self.strip {
            record = record.replace(marker.as_str(), "");
        }
        Some(record)
    }

    /// Full table pass over one page's fragments
    pub fn assemble(&self, mut fragments: Vec<PositionedFragment>, policy: &RowPolicy) -> Vec<String> {
        let anchors = self.capture_anchors(&mut fragments);
        tracing::debug!(
            "Captured anchors: {:?}",
            anchors.iter().map(|(k, v)| (k, &v.word)).collect::<Vec<_>>()
        );

        cluster_rows(fragments, policy)
            .into_iter()
            .filter_map(|(key, row)| match self.header_below {
                Some(cutoff) if key < cutoff => {
                    let line = flat_join(&row);
                    (!line.trim().is_empty()).then_some(line)
                }
                _ => self.render_row(&row, &anchors),
            })
            .collect()
    }
}

/// Parenthesized question markers and their hyphenated form. Only single
/// digits are covered.
const QUESTION_MARKERS: [(&str, &str); 36] = [
    (" (1)", "-1"), (" (2)", "-2"), (" (3)", "-3"), (" (4)", "-4"), (" (5)", "-5"),
    (" (6)", "-6"), (" (7)", "-7"), (" (8)", "-8"), (" (9)", "-9"),
    ("(1)", "-1"), ("(2)", "-2"), ("(3)", "-3"), ("(4)", "-4"), ("(5)", "-5"),
    ("(6)", "-6"), ("(7)", "-7"), ("(8)", "-8"), ("(9)", "-9"),
    (" （1）", "-1"), (" （2）", "-2"), (" （3）", "-3"), (" （4）", "-4"), (" （5）", "-5"),
    (" （6）", "-6"), (" （7）", "-7"), (" （8）", "-8"), (" （9）", "-9"),
    ("（1）", "-1"), ("（2）", "-2"), ("（3）", "-3"), ("（4）", "-4"), ("（5）", "-5"),
    ("（6）", "-6"), ("（7）", "-7"), ("（8）", "-8"), ("（9）", "-9"),
];

/// Rewrite a question index: `(n)` markers become `-n`, remaining spaces become `-`.
pub fn normalize_question_index(text: &str) -> String {
    let mut normalized = text.trim().to_string();
    for (marker, replacement) in QUESTION_MARKERS {
        normalized = normalized.replace(marker, replacement);
    }
    normalized.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_at(y: u32, items: &[(u32, &str)]) -> Vec<PositionedFragment> {
        items
            .iter()
            .map(|&(x, word)| PositionedFragment::new(x, y, word))
            .collect()
    }

    fn bands_only() -> TableTemplate {
        TableTemplate {
            anchors: vec![],
            header_below: None,
            ..TableTemplate::test_sheet()
        }
    }

    #[test]
    fn test_question_index_markers() {
        assert_eq!(normalize_question_index("問(1)"), "問-1");
        assert_eq!(normalize_question_index("3 (2)"), "3-2");
        assert_eq!(normalize_question_index("4（9）"), "4-9");
        assert_eq!(normalize_question_index("大問 2"), "大問-2");
        assert_eq!(normalize_question_index("5(10)"), "5(10)");
        assert_eq!(normalize_question_index("5(0)"), "5(0)");
    }

    #[test]
    fn test_anchor_transforms() {
        assert_eq!(AnchorTransform::Whole.apply("国語"), "国語");
        assert_eq!(AnchorTransform::Tail { chars: 2 }.apply("科目:国語"), "国語");
        assert_eq!(AnchorTransform::Tail { chars: 4 }.apply("12"), "12");
        assert_eq!(
            AnchorTransform::DigitsAfter {
                prefix: "第".to_string()
            }
            .apply("2024年 第12回"),
            "12"
        );
        assert_eq!(
            AnchorTransform::DigitsAfter {
                prefix: "No.".to_string()
            }
            .apply("none"),
            ""
        );
    }

    #[test]
    fn test_banded_triple_in_record_order() {
        let template = bands_only();
        let row = row_at(150, &[(630, "75%"), (300, "content"), (90, "Q1")]);

        let record = template.render_row(&row, &Anchors::new()).unwrap();
        assert_eq!(record, "||週テスト|content||75%|Q1");
    }

    #[test]
    fn test_record_splits_content_and_strips_markers() {
        let template = bands_only();
        let row = row_at(
            150,
            &[(90, "1 (2)"), (230, "【復習】計算"), (300, "・小数 の"), (360, "かけ算"), (640, "62 %")],
        );

        let record = template.render_row(&row, &Anchors::new()).unwrap();
        assert_eq!(record, "||週テスト|計算|小数のかけ算|62%|1-2");
    }

    #[test]
    fn test_blank_rows_are_suppressed() {
        let template = bands_only();
        let fragments = vec![
            PositionedFragment::new(90, 150, "Q1"),
            PositionedFragment::new(90, 180, "  "),
            PositionedFragment::new(700, 210, "outside"),
            PositionedFragment::new(90, 240, "Q2"),
        ];

        let records = template.assemble(fragments, &RowPolicy::Snap { cutoff: 120, step: 15 });
        assert_eq!(records, vec!["||週テスト||||Q1", "||週テスト||||Q2"]);
    }

    #[test]
    fn test_anchors_captured_and_removed() {
        let template = TableTemplate::test_sheet();
        let mut fragments = vec![
            PositionedFragment::new(40, 30, "第0012回"),
            PositionedFragment::new(100, 64, "クラス"),
            PositionedFragment::new(150, 65, "科目国語"),
            PositionedFragment::new(40, 30, "第0012回"),
            PositionedFragment::new(90, 151, "1"),
        ];

        let anchors = template.capture_anchors(&mut fragments);
        assert_eq!(anchors["session"].word, "第0012回");
        assert_eq!(anchors["subject"].word, "科目国語");
        assert_eq!(
            fragments,
            vec![
                PositionedFragment::new(100, 64, "クラス"),
                PositionedFragment::new(90, 151, "1"),
            ]
        );
    }

    #[test]
    fn test_full_sheet() {
        let template = TableTemplate::test_sheet();
        let fragments = vec![
            PositionedFragment::new(40, 30, "2024第0012回"),
            PositionedFragment::new(150, 64, "科目算数"),
            PositionedFragment::new(100, 64, "クラスA"),
            PositionedFragment::new(90, 152, "1 (1)"),
            PositionedFragment::new(250, 149, "図形・面積"),
            PositionedFragment::new(630, 151, "80%"),
            PositionedFragment::new(90, 181, ""),
        ];

        let records = template.assemble(fragments, &RowPolicy::Snap { cutoff: 120, step: 15 });
        assert_eq!(records, vec!["クラスA", "算数|012回|週テスト|図形|面積|80%|1-1"]);
    }
}
