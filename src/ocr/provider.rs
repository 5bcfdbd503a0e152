//! OCR Providers
//!
//! Defines the provider trait and implementations for different OCR backends.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use super::types::{AnnotateFileResponse, AnnotateImageResponse, Feature, OcrError, OcrProvider};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Run a detection feature over a single image
    async fn annotate_image(
        &self,
        image_data: &[u8],
        feature: Feature,
        language: Option<&str>,
    ) -> Result<AnnotateImageResponse, OcrError>;

    /// Run document text detection over every page of a PDF
    async fn annotate_pdf(
        &self,
        pdf_data: &[u8],
        language: Option<&str>,
    ) -> Result<AnnotateFileResponse, OcrError>;
}

// ============================================================================
// Cloud Vision
// ============================================================================

/// Cloud Vision REST provider
///
/// Holds one `reqwest::Client` for the lifetime of the process so that
/// connections are pooled across requests.
pub struct VisionProvider {
    client: reqwest::Client,
    /// API base URL, e.g. `https://vision.googleapis.com/v1`
    endpoint: String,
    /// API key sent as the `key` query parameter
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct BatchImageResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
struct BatchFileResponse {
    #[serde(default)]
    responses: Vec<AnnotateFileResponse>,
}

impl VisionProvider {
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }

    fn api_key(&self) -> Result<&str, OcrError> {
        self.api_key.as_deref().ok_or_else(|| {
            OcrError::ProviderNotAvailable("VISION_API_KEY is not configured".to_string())
        })
    }

    fn language_hints(language: Option<&str>) -> Vec<&str> {
        language.filter(|l| !l.is_empty()).into_iter().collect()
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, OcrError> {
        let url = format!("{}/{}", self.endpoint, method);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key()?)])
            .json(body)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Vision: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Vision returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl OcrProviderTrait for VisionProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Vision
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn annotate_image(
        &self,
        image_data: &[u8],
        feature: Feature,
        language: Option<&str>,
    ) -> Result<AnnotateImageResponse, OcrError> {
        let content = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [{ "type": feature }],
                "imageContext": { "languageHints": Self::language_hints(language) },
            }]
        });

        let batch: BatchImageResponse = self.post("images:annotate", &request).await?;
        let response = batch.responses.into_iter().next().ok_or_else(|| {
            OcrError::InvalidResponse("Vision returned no image responses".to_string())
        })?;

        match response.error {
            Some(status) => Err(status.into()),
            None => Ok(response),
        }
    }

    async fn annotate_pdf(
        &self,
        pdf_data: &[u8],
        language: Option<&str>,
    ) -> Result<AnnotateFileResponse, OcrError> {
        let content = base64::engine::general_purpose::STANDARD.encode(pdf_data);

        let request = serde_json::json!({
            "requests": [{
                "inputConfig": { "content": content, "mimeType": "application/pdf" },
                "features": [{ "type": Feature::DocumentTextDetection }],
                "imageContext": { "languageHints": Self::language_hints(language) },
            }]
        });

        let batch: BatchFileResponse = self.post("files:annotate", &request).await?;
        let response = batch.responses.into_iter().next().unwrap_or_default();

        if let Some(status) = &response.error {
            return Err(status.clone().into());
        }
        let page_error = response
            .responses
            .iter()
            .flatten()
            .find_map(|page| page.error.clone());
        match page_error {
            Some(status) => Err(status.into()),
            None => Ok(response),
        }
    }
}

// ============================================================================
// Static
// ============================================================================

/// Provider that answers every call with canned responses
///
/// Used to replay recorded payloads offline and to drive the HTTP layer in
/// tests without network access.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pub image: AnnotateImageResponse,
    pub file: AnnotateFileResponse,
}

impl StaticProvider {
    pub fn with_image(image: AnnotateImageResponse) -> Self {
        Self {
            image,
            ..Default::default()
        }
    }

    pub fn with_file(file: AnnotateFileResponse) -> Self {
        Self {
            file,
            ..Default::default()
        }
    }
}

#[async_trait]
impl OcrProviderTrait for StaticProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Static
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn annotate_image(
        &self,
        _image_data: &[u8],
        _feature: Feature,
        _language: Option<&str>,
    ) -> Result<AnnotateImageResponse, OcrError> {
        Ok(self.image.clone())
    }

    async fn annotate_pdf(
        &self,
        _pdf_data: &[u8],
        _language: Option<&str>,
    ) -> Result<AnnotateFileResponse, OcrError> {
        Ok(self.file.clone())
    }
}

/// Failing provider for testing error propagation
#[cfg(test)]
pub struct FailingProvider;

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for FailingProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Vision
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn annotate_image(
        &self,
        _image_data: &[u8],
        _feature: Feature,
        _language: Option<&str>,
    ) -> Result<AnnotateImageResponse, OcrError> {
        Err(OcrError::ApiError("upstream rejected the request".to_string()))
    }

    async fn annotate_pdf(
        &self,
        _pdf_data: &[u8],
        _language: Option<&str>,
    ) -> Result<AnnotateFileResponse, OcrError> {
        Err(OcrError::ApiError("upstream rejected the request".to_string()))
    }
}
