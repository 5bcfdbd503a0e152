//! Route modules for the Vision Lines server

pub mod health;
pub mod image;
pub mod pdf;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config().server.body_limit;

    Router::new()
        .merge(health::router())
        .merge(image::router())
        .merge(pdf::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Request body shared by every recognition endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrRequest {
    /// Base64-encoded image or PDF
    pub content: String,
    /// Language hint, falling back to the configured default
    #[serde(default)]
    pub language: Option<String>,
}

impl OcrRequest {
    /// Decode the base64 payload
    pub fn decode(&self) -> Result<Vec<u8>> {
        let data = BASE64.decode(self.content.trim())?;
        if data.is_empty() {
            return Err(crate::error::AppError::BadRequest("Empty content".to_string()));
        }
        Ok(data)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// `200 OK` without a body, used when recognition found nothing to report
pub(crate) fn empty() -> Response {
    StatusCode::OK.into_response()
}

/// JSON body, or an empty response when there is nothing to send
pub(crate) fn json_or_empty<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::error::AppError;
    use crate::ocr::StaticProvider;
    use crate::reconstruct::Layouts;

    fn app_with_limit(body_limit: usize) -> Router {
        let mut config = Config::default();
        config.server.body_limit = body_limit;
        app(AppState::new(
            config,
            Layouts::default(),
            Arc::new(StaticProvider::default()),
        ))
    }

    fn post_json(path: &str, content: &[u8]) -> Request<Body> {
        let body = serde_json::to_vec(&OcrRequest {
            content: BASE64.encode(content),
            language: None,
        })
        .unwrap();

        Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_limit() {
        let response = app_with_limit(1024)
            .oneshot(post_json("/image2lines", &[0u8; 4096]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = app_with_limit(1024)
            .oneshot(post_json("/image2lines", b"small"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_decode() {
        let request = OcrRequest {
            content: format!(" {} \n", BASE64.encode(b"pdf")),
            language: Some("en".to_string()),
        };
        assert_eq!(request.decode().unwrap(), b"pdf");
        assert_eq!(request.language(), Some("en"));

        let blank = OcrRequest {
            content: String::new(),
            language: None,
        };
        assert!(matches!(blank.decode(), Err(AppError::BadRequest(_))));
    }
}
