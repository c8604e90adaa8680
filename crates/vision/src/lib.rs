//! Vision - form field analysis through a hosted vision-language model
//!
//! This crate provides:
//! - The [`FieldAnalyzer`] trait, a narrow seam over the model call so the
//!   placement pipeline can run against a stub
//! - [`ModelClient`], a Messages API client that sends one page image plus
//!   an answer summary and parses the returned candidate array
//! - Tolerant JSON-array extraction from free-form model text

mod client;
mod prompts;
mod schema;

pub use client::{FieldAnalyzer, ModelClient, DEFAULT_MODEL};
pub use schema::{parse_candidates, FieldCandidate};

use thiserror::Error;

/// Errors that can occur during field analysis
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Failed to encode page image: {0}")]
    Encode(String),

    #[error("Model request failed: {0}")]
    Request(String),

    #[error("Model returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No JSON array found in model response")]
    MissingArray,

    #[error("Failed to parse field candidates: {0}")]
    Malformed(String),
}

/// Result type for field analysis operations
pub type Result<T> = std::result::Result<T, VisionError>;

/// Encode an image as PNG bytes for the model payload.
pub fn png_bytes(image: &image::DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| VisionError::Encode(e.to_string()))?;
    Ok(buffer)
}
