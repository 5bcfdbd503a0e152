//! Configuration management for the Vision Lines server

use std::env;
use std::path::PathBuf;

use crate::reconstruct::{LayoutError, Layouts};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Layouts error: {0}")]
    Layouts(#[from] LayoutError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    /// JSON file overriding the built-in layouts
    pub layouts_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub default_language: String,
    /// Raw OCR responses are written here when set
    pub dump_dir: Option<PathBuf>,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;
const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1";
const DEFAULT_LANGUAGE: &str = "ja";

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                body_limit: DEFAULT_BODY_LIMIT,
            },
            ocr: OcrConfig {
                api_key: None,
                endpoint: DEFAULT_ENDPOINT.to_string(),
                default_language: DEFAULT_LANGUAGE.to_string(),
                dump_dir: None,
            },
            layouts_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or("EXPOSE_PORT", var("EXPOSE_PORT"), DEFAULT_PORT)?,
                body_limit: parse_or("BODY_LIMIT_BYTES", var("BODY_LIMIT_BYTES"), DEFAULT_BODY_LIMIT)?,
            },
            ocr: OcrConfig {
                api_key: var("VISION_API_KEY"),
                endpoint: var("VISION_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                default_language: var("DEFAULT_LANGUAGE")
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                dump_dir: var("DEBUG_DUMP_DIR").map(PathBuf::from),
            },
            layouts_path: var("LAYOUTS_PATH").map(PathBuf::from),
        })
    }

    /// Built-in layouts, overridden by the layouts file when one is configured
    pub fn load_layouts(&self) -> Result<Layouts, ConfigError> {
        match &self.layouts_path {
            Some(path) => {
                tracing::info!("Loading layouts from {}", path.display());
                Ok(Layouts::from_json_file(path)?)
            }
            None => Ok(Layouts::default()),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
