//! Vision Lines Server Library
//!
//! Rebuilds reading lines, paragraphs and score sheet records from the glyph
//! geometry returned by Cloud Vision. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `reconstruct`: geometry pipeline (extraction, clustering, assembly)
//! - `ocr`: Vision wire types, providers and the OCR service
//! - `routes`: HTTP endpoints

pub mod config;
pub mod error;
pub mod ocr;
pub mod reconstruct;
pub mod routes;
pub mod state;
