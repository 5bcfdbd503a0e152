//! PDF recognition endpoint
//!
//! `POST /pdf2lines` runs document detection over every page of a score
//! sheet PDF and returns the delimited records of all pages in order.

use axum::{extract::State, response::Response, routing::post, Json, Router};

use super::{json_or_empty, OcrRequest};
use crate::error::Result;
use crate::reconstruct::reconstruct_lines;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/pdf2lines", post(pdf_to_lines))
}

async fn pdf_to_lines(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Response> {
    let pdf = request.decode()?;
    let response = state.ocr().annotate_pdf(&pdf, request.language()).await?;
    let language = state.ocr().language(request.language());
    let layout = &state.layouts().table;

    let records = response.responses.as_ref().map(|pages| {
        tracing::debug!(
            "PDF annotated: {} page responses of {:?} total pages",
            pages.len(),
            response.total_pages
        );
        pages
            .iter()
            .flat_map(|page| reconstruct_lines(page.pages().unwrap_or_default(), layout, language))
            .collect::<Vec<String>>()
    });
    if let Some(records) = &records {
        tracing::info!("Reconstructed {} records", records.len());
    }

    Ok(json_or_empty(records))
}
