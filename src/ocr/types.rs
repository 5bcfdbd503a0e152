//! OCR Types
//!
//! Wire types for the Cloud Vision REST API and the errors raised while
//! talking to it. Every level of the text hierarchy is optional: the API
//! omits empty lists and zero-valued numbers, so absence is the normal
//! "nothing recognized here" case rather than an error.

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Google Cloud Vision REST API
    Vision,
    /// Canned responses (tests, offline replays)
    Static,
}

/// Detection feature requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Sparse text in photos and screenshots
    TextDetection,
    /// Dense text, handwriting and scanned documents
    DocumentTextDetection,
}

impl Feature {
    /// Short name used in logs and dump file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextDetection => "text",
            Self::DocumentTextDetection => "document",
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Result of annotating one image (or one PDF page)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text_annotation: Option<TextAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

impl AnnotateImageResponse {
    /// Pages of the full text annotation, if any were returned
    pub fn pages(&self) -> Option<&[Page]> {
        self.full_text_annotation
            .as_ref()
            .and_then(|annotation| annotation.pages.as_deref())
    }

    /// Already-joined text of the full text annotation
    pub fn text(&self) -> Option<&str> {
        self.full_text_annotation
            .as_ref()
            .and_then(|annotation| annotation.text.as_deref())
    }
}

/// Result of annotating a file (PDF)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateFileResponse {
    /// One response per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<AnnotateImageResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

/// Error status embedded in a response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Hierarchical text structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<Paragraph>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<Symbol>>,
}

/// A single recognized glyph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<TextProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub text: String,
}

impl Symbol {
    /// Detected break following this glyph
    pub fn break_type(&self) -> Option<BreakType> {
        self.property
            .as_ref()
            .and_then(|p| p.detected_break.as_ref())
            .map(|b| b.break_type)
    }

    /// Language codes detected for this glyph (empty when none were reported)
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.property
            .iter()
            .flat_map(|p| p.detected_languages.iter().flatten())
            .map(|l| l.language_code.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_languages: Option<Vec<DetectedLanguage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_break: Option<DetectedBreak>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLanguage {
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBreak {
    #[serde(rename = "type", default)]
    pub break_type: BreakType,
    #[serde(default)]
    pub is_prefix: bool,
}

/// Break classification reported after a glyph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakType {
    #[default]
    Unknown,
    /// Regular inter-word space
    Space,
    /// Wide inter-word space
    SureSpace,
    /// Line-wrapping break
    EolSureSpace,
    /// End-of-line hyphen
    Hyphen,
    /// Line break that ends a paragraph
    LineBreak,
}

/// Bounding polygon in pixel or normalized coordinates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Vertex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

/// Pixel vertex. The API omits zero coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Vertex in [0, 1] page-relative coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

// ============================================================================
// Errors
// ============================================================================

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid OCR response: {0}")]
    InvalidResponse(String),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::ProviderNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<Status> for OcrError {
    fn from(status: Status) -> Self {
        OcrError::ApiError(format!("{} (code {})", status.message, status.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_sparse_vision_payload() {
        let json = r#"{
            "fullTextAnnotation": {
                "pages": [{
                    "blocks": [{
                        "paragraphs": [{
                            "words": [{
                                "boundingBox": { "vertices": [{ "y": 12 }, { "x": 40, "y": 12 }] },
                                "symbols": [{
                                    "text": "A",
                                    "property": {
                                        "detectedLanguages": [{ "languageCode": "en" }],
                                        "detectedBreak": { "type": "EOL_SURE_SPACE" }
                                    }
                                }]
                            }]
                        }]
                    }]
                }],
                "text": "A\n"
            }
        }"#;

        let response: AnnotateImageResponse = serde_json::from_str(json).unwrap();
        let pages = response.pages().unwrap();
        let word = &pages[0].blocks.as_ref().unwrap()[0].paragraphs.as_ref().unwrap()[0]
            .words
            .as_ref()
            .unwrap()[0];
        let symbol = &word.symbols.as_ref().unwrap()[0];

        assert_eq!(word.bounding_box.as_ref().unwrap().vertices[0], Vertex { x: 0, y: 12 });
        assert_eq!(symbol.break_type(), Some(BreakType::EolSureSpace));
        assert_eq!(symbol.languages().collect::<Vec<_>>(), vec!["en"]);
        assert_eq!(response.text(), Some("A\n"));
    }

    #[test]
    fn test_empty_payload_has_no_pages() {
        let response: AnnotateImageResponse = serde_json::from_str("{}").unwrap();
        assert!(response.pages().is_none());
        assert!(response.text().is_none());
    }

    #[test]
    fn test_error_status_codes() {
        use axum::http::StatusCode;
        assert_eq!(
            OcrError::ProviderNotAvailable("no key".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            OcrError::ApiError("quota".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
