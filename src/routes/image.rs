//! Image recognition endpoints
//!
//! - `POST /image2lines`: visual lines, top to bottom
//! - `POST /image2words`: distinct alphabetic words (logged only)
//! - `POST /image2texts`: the provider's own full text, split into lines
//! - `POST /image2paragraph`: one text block in reading order
//! - `POST /handwriting`: dense document detection (logged only)

use std::io::Cursor;

use axum::{extract::State, response::Response, routing::post, Json, Router};

use super::{empty, json_or_empty, OcrRequest};
use crate::error::Result;
use crate::ocr::{AnnotateImageResponse, Feature};
use crate::reconstruct::{format, reconstruct_lines, reconstruct_paragraph, reconstruct_words};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image2lines", post(image_to_lines))
        .route("/image2words", post(image_to_words))
        .route("/image2texts", post(image_to_texts))
        .route("/image2paragraph", post(image_to_paragraph))
        .route("/handwriting", post(handwriting))
}

/// Decode the request image and run one detection pass
async fn annotate(
    state: &AppState,
    request: &OcrRequest,
    feature: Feature,
) -> Result<AnnotateImageResponse> {
    let image = request.decode()?;
    log_dimensions(&image);

    Ok(state
        .ocr()
        .annotate_image(&image, feature, request.language())
        .await?)
}

/// Log the image size from its header without decoding pixels
fn log_dimensions(data: &[u8]) {
    let dimensions = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.into_dimensions());

    match dimensions {
        Ok((width, height)) => tracing::debug!("Received {}x{} image", width, height),
        Err(e) => tracing::warn!("Could not read image dimensions: {}", e),
    }
}

async fn image_to_lines(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let response = annotate(&state, &request, Feature::TextDetection).await?;
    let language = state.ocr().language(request.language());

    let lines = response
        .pages()
        .map(|pages| reconstruct_lines(pages, &state.layouts().lines, language));
    if let Some(lines) = &lines {
        tracing::info!("Reconstructed {} lines", lines.len());
    }

    Ok(json_or_empty(lines))
}

async fn image_to_words(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let response = annotate(&state, &request, Feature::TextDetection).await?;
    let language = state.ocr().language(request.language());

    let words = reconstruct_words(
        response.pages().unwrap_or_default(),
        &state.layouts().words,
        language,
    );
    tracing::info!("Recognized {} words: {:?}", words.len(), words);

    Ok(empty())
}

async fn image_to_texts(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let response = annotate(&state, &request, Feature::TextDetection).await?;

    Ok(json_or_empty(response.text().map(format::split_full_text)))
}

async fn image_to_paragraph(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let response = annotate(&state, &request, Feature::TextDetection).await?;
    let language = state.ocr().language(request.language());

    Ok(json_or_empty(response.pages().map(|pages| {
        reconstruct_paragraph(pages, &state.layouts().paragraph, language)
    })))
}

async fn handwriting(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let response = annotate(&state, &request, Feature::DocumentTextDetection).await?;
    tracing::info!(
        "Handwriting detection: {} pages, text {:?}",
        response.pages().map_or(0, |pages| pages.len()),
        response.text().unwrap_or_default()
    );

    Ok(empty())
}
