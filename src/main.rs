//! Vision Lines Server
//!
//! HTTP front end that sends images and PDFs to Cloud Vision and rebuilds
//! lines, paragraphs and table records from the returned glyph positions.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vision_lines_server::config::Config;
use vision_lines_server::ocr::VisionProvider;
use vision_lines_server::reconstruct::Layouts;
use vision_lines_server::routes;
use vision_lines_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "vision_lines_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let layouts = config.load_layouts().unwrap_or_else(|e| {
        tracing::warn!("Failed to load layouts: {}, using built-in presets", e);
        Layouts::default()
    });

    tracing::info!("Starting Vision Lines Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Vision endpoint: {}", config.ocr.endpoint);
    tracing::info!("Default language: {}", config.ocr.default_language);
    if config.ocr.api_key.is_none() {
        tracing::warn!("VISION_API_KEY is not set; recognition requests will fail with 503");
    }
    if let Some(dir) = &config.ocr.dump_dir {
        tracing::info!("Dumping OCR responses to {}", dir.display());
    }

    let provider = VisionProvider::new(&config.ocr.endpoint, config.ocr.api_key.as_deref());
    let state = AppState::new(config.clone(), layouts, Arc::new(provider));
    let app = routes::app(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Vision Lines Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
