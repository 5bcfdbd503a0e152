//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrProviderTrait, OcrService, OcrServiceConfig};
use crate::reconstruct::Layouts;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    layouts: Layouts,
    ocr: OcrService,
}

impl AppState {
    /// Create a new application state around an OCR provider
    pub fn new(config: Config, layouts: Layouts, provider: Arc<dyn OcrProviderTrait>) -> Self {
        let ocr = OcrService::new(
            OcrServiceConfig {
                default_language: config.ocr.default_language.clone(),
                dump_dir: config.ocr.dump_dir.clone(),
            },
            provider,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                layouts,
                ocr,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the reconstruction layouts
    pub fn layouts(&self) -> &Layouts {
        &self.inner.layouts
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
