//! Health endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::ocr::OcrProvider;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(version))
        .route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub ocr_provider: OcrProvider,
    pub ocr_available: bool,
}

/// Plain version string
async fn version() -> &'static str {
    concat!("v", env!("CARGO_PKG_VERSION"))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: env!("CARGO_PKG_NAME"),
        ocr_provider: state.ocr().provider_type(),
        ocr_available: state.ocr().is_available().await,
    })
}
