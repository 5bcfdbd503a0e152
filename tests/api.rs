//! HTTP API tests driven by canned Vision responses

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};

use vision_lines_server::config::Config;
use vision_lines_server::ocr::{
    AnnotateFileResponse, AnnotateImageResponse, OcrProviderTrait, StaticProvider, VisionProvider,
};
use vision_lines_server::reconstruct::Layouts;
use vision_lines_server::routes;
use vision_lines_server::state::AppState;

fn server_with(provider: impl OcrProviderTrait + 'static) -> TestServer {
    let state = AppState::new(Config::default(), Layouts::default(), Arc::new(provider));
    TestServer::new(routes::app(state)).unwrap()
}

fn image_server(response: Value) -> TestServer {
    let image: AnnotateImageResponse = serde_json::from_value(response).unwrap();
    server_with(StaticProvider::with_image(image))
}

fn file_server(response: Value) -> TestServer {
    let file: AnnotateFileResponse = serde_json::from_value(response).unwrap();
    server_with(StaticProvider::with_file(file))
}

fn request_body() -> Value {
    json!({ "content": BASE64.encode(b"scanned bytes"), "language": "ja" })
}

fn pixel_word(x: i32, y: i32, text: &str) -> Value {
    json!({
        "boundingBox": { "vertices": [{ "x": x, "y": y }, { "x": x + 30, "y": y + 12 }] },
        "symbols": text.chars().map(|c| json!({ "text": c.to_string() })).collect::<Vec<_>>()
    })
}

fn normalized_word(x: f64, y: f64, text: &str) -> Value {
    json!({
        "boundingBox": { "normalizedVertices": [{ "x": x, "y": y }] },
        "symbols": text.chars().map(|c| json!({ "text": c.to_string() })).collect::<Vec<_>>()
    })
}

fn page(paragraphs: Vec<Vec<Value>>) -> Value {
    json!({
        "blocks": [{
            "paragraphs": paragraphs
                .into_iter()
                .map(|words| json!({ "words": words }))
                .collect::<Vec<_>>()
        }]
    })
}

fn annotation(pages: Vec<Value>, text: &str) -> Value {
    json!({ "fullTextAnnotation": { "pages": pages, "text": text } })
}

fn sample_image() -> Value {
    annotation(
        vec![page(vec![
            vec![pixel_word(50, 30, "B"), pixel_word(10, 30, "A")],
            vec![pixel_word(5, 64, "C")],
        ])],
        "AB\nC",
    )
}

fn sheet_page() -> Value {
    page(vec![
        vec![normalized_word(0.040, 0.0305, "第0012回")],
        vec![normalized_word(0.150, 0.0649, "科目算数")],
        vec![normalized_word(0.090, 0.150, "1 (2)")],
        vec![normalized_word(0.250, 0.150, "図形・面積")],
        vec![normalized_word(0.630, 0.150, "80%")],
    ])
}

#[tokio::test]
async fn test_version_and_health() {
    let server = image_server(json!({}));

    let response = server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "v1.0.0");

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocr_provider"], "static");
    assert_eq!(body["ocr_available"], true);
}

#[tokio::test]
async fn test_image_to_lines() {
    let server = image_server(sample_image());

    let response = server.post("/image2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<String>>(), vec!["AB", "C"]);
}

#[tokio::test]
async fn test_image_to_lines_without_pages_is_empty() {
    let server = image_server(json!({}));

    let response = server.post("/image2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "");
}

#[tokio::test]
async fn test_image_to_lines_with_empty_hierarchy() {
    let server = image_server(annotation(vec![json!({}), page(vec![vec![]])], ""));

    let response = server.post("/image2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert!(response.json::<Vec<String>>().is_empty());
}

#[tokio::test]
async fn test_image_to_paragraph() {
    let server = image_server(sample_image());

    let response = server.post("/image2paragraph").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.json::<String>(), "AB\nC");
}

#[tokio::test]
async fn test_image_to_texts() {
    let server = image_server(sample_image());

    let response = server.post("/image2texts").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<String>>(), vec!["AB", "C"]);

    let server = image_server(json!({}));
    let response = server.post("/image2texts").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "");
}

#[tokio::test]
async fn test_words_and_handwriting_respond_without_body() {
    let server = image_server(sample_image());

    for path in ["/image2words", "/handwriting"] {
        let response = server.post(path).json(&request_body()).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "");
    }
}

#[tokio::test]
async fn test_pdf_to_lines_across_pages() {
    let server = file_server(json!({
        "responses": [
            annotation(vec![sheet_page()], ""),
            annotation(vec![sheet_page()], ""),
            {}
        ],
        "totalPages": 3
    }));

    let response = server.post("/pdf2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Vec<String>>(),
        vec![
            "算数|012回|週テスト|図形|面積|80%|1-2",
            "算数|012回|週テスト|図形|面積|80%|1-2",
        ]
    );
}

#[tokio::test]
async fn test_pdf_without_page_responses_is_empty() {
    let server = file_server(json!({}));

    let response = server.post("/pdf2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "");
}

#[tokio::test]
async fn test_invalid_base64_is_rejected() {
    let server = image_server(sample_image());

    let response = server
        .post("/image2lines")
        .json(&json!({ "content": "%%% not base64 %%%" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_missing_api_key_is_service_unavailable() {
    let server = server_with(VisionProvider::new("https://vision.googleapis.com/v1", None));

    let response = server.post("/image2lines").json(&request_body()).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "ocr_unavailable");

    let response = server.get("/health").await;
    let body: Value = response.json();
    assert_eq!(body["ocr_available"], false);
}

/// Serve `body` for every request on a local port, returning the base URL
async fn serve_canned(body: Value) -> String {
    let app = axum::Router::new().fallback(move || {
        let body = body.clone();
        async move { axum::Json(body) }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}/v1", addr)
}

#[tokio::test]
async fn test_pdf_page_error_is_bad_gateway() {
    let endpoint = serve_canned(json!({
        "responses": [{
            "responses": [
                annotation(vec![sheet_page()], ""),
                { "error": { "code": 13, "message": "Internal error" } }
            ],
            "totalPages": 2
        }]
    }))
    .await;
    let server = server_with(VisionProvider::new(&endpoint, Some("key")));

    let response = server.post("/pdf2lines").json(&request_body()).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "ocr_error");
}

#[tokio::test]
async fn test_pdf_headers_are_read_per_page() {
    let second_page = page(vec![
        vec![normalized_word(0.040, 0.0305, "第0013回")],
        vec![normalized_word(0.150, 0.0649, "科目国語")],
        vec![normalized_word(0.090, 0.150, "2")],
        vec![normalized_word(0.250, 0.150, "漢字・読み")],
        vec![normalized_word(0.630, 0.150, "55%")],
    ]);
    let headerless_page = page(vec![
        vec![normalized_word(0.090, 0.150, "3")],
        vec![normalized_word(0.250, 0.150, "文法")],
    ]);
    let server = file_server(json!({
        "responses": [
            annotation(vec![sheet_page()], ""),
            annotation(vec![second_page], ""),
            annotation(vec![headerless_page], "")
        ]
    }));

    let response = server.post("/pdf2lines").json(&request_body()).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Vec<String>>(),
        vec![
            "算数|012回|週テスト|図形|面積|80%|1-2",
            "国語|013回|週テスト|漢字|読み|55%|2",
            "||週テスト|文法|||3",
        ]
    );
}
