//! OCR Service
//!
//! Wraps the configured provider with default language handling, logging and
//! optional dumps of raw responses for offline debugging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::{
    provider::OcrProviderTrait,
    types::{AnnotateFileResponse, AnnotateImageResponse, Feature, OcrError, OcrProvider},
};

/// OCR service configuration
#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    /// Language used when a request does not name one
    pub default_language: String,
    /// Directory receiving raw response dumps (disabled when `None`)
    pub dump_dir: Option<PathBuf>,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            default_language: "ja".to_string(),
            dump_dir: None,
        }
    }
}

/// OCR service shared by all request handlers
#[derive(Clone)]
pub struct OcrService {
    config: OcrServiceConfig,
    provider: Arc<dyn OcrProviderTrait>,
}

impl OcrService {
    /// Create a new OCR service
    pub fn new(config: OcrServiceConfig, provider: Arc<dyn OcrProviderTrait>) -> Self {
        Self { config, provider }
    }

    pub fn provider_type(&self) -> OcrProvider {
        self.provider.provider_type()
    }

    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Resolve the language for a request
    pub fn language<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(self.config.default_language.as_str())
    }

    /// Annotate an image with the given feature
    pub async fn annotate_image(
        &self,
        image_data: &[u8],
        feature: Feature,
        language: Option<&str>,
    ) -> Result<AnnotateImageResponse, OcrError> {
        let lang = self.language(language);
        tracing::debug!(
            "OCR {} detection via {:?} ({} bytes, language {})",
            feature.as_str(),
            self.provider.provider_type(),
            image_data.len(),
            lang
        );

        let response = self
            .provider
            .annotate_image(image_data, feature, Some(lang))
            .await?;

        self.dump(feature.as_str(), &response).await;
        Ok(response)
    }

    /// Annotate every page of a PDF
    pub async fn annotate_pdf(
        &self,
        pdf_data: &[u8],
        language: Option<&str>,
    ) -> Result<AnnotateFileResponse, OcrError> {
        let lang = self.language(language);
        tracing::debug!(
            "OCR PDF detection via {:?} ({} bytes, language {})",
            self.provider.provider_type(),
            pdf_data.len(),
            lang
        );

        let response = self.provider.annotate_pdf(pdf_data, Some(lang)).await?;

        self.dump("pdf", &response).await;
        Ok(response)
    }

    async fn dump<T: Serialize>(&self, kind: &str, payload: &T) {
        let Some(dir) = &self.config.dump_dir else {
            return;
        };

        match write_dump(dir, kind, payload).await {
            Ok(path) => tracing::debug!("Wrote OCR dump to {}", path.display()),
            Err(e) => tracing::warn!("Failed to write OCR dump: {}", e),
        }
    }
}

/// Write a payload as pretty JSON into `dir`, returning the file path
async fn write_dump<T: Serialize>(dir: &Path, kind: &str, payload: &T) -> std::io::Result<PathBuf> {
    let json = serde_json::to_vec_pretty(payload)?;

    tokio::fs::create_dir_all(dir).await?;
    let name = format!(
        "{}-{}-{}.json",
        chrono::Utc::now().format("%Y%m%dT%H%M%S"),
        uuid::Uuid::new_v4(),
        kind
    );
    let path = dir.join(name);
    tokio::fs::write(&path, json).await?;

    Ok(path)
}
