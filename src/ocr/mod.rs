//! OCR Module
//!
//! The external recognition collaborator: given image or PDF bytes it returns
//! the Vision text hierarchy (pages → blocks → paragraphs → words → symbols).
//!
//! Supported backends:
//! - Cloud Vision REST API (requires `VISION_API_KEY`)
//! - Static canned responses (offline replays, tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vision_lines_server::ocr::{Feature, OcrService, OcrServiceConfig, VisionProvider};
//!
//! let provider = VisionProvider::new("https://vision.googleapis.com/v1", Some(&key));
//! let service = OcrService::new(OcrServiceConfig::default(), Arc::new(provider));
//!
//! let response = service
//!     .annotate_image(&image_bytes, Feature::TextDetection, Some("ja"))
//!     .await?;
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, StaticProvider, VisionProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{
    AnnotateFileResponse, AnnotateImageResponse, Block, BoundingPoly, BreakType, DetectedBreak,
    DetectedLanguage, Feature, NormalizedVertex, OcrError, OcrProvider, Page, Paragraph, Status,
    Symbol, TextAnnotation, TextProperty, Vertex, Word,
};
