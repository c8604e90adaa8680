//! PDF Core - PDF output primitives for fillkit
//!
//! This crate provides:
//! - Opening and saving PDF documents
//! - Stamping text at page coordinates with the built-in Helvetica font
//! - Rasterizing a page to an image for analysis and previews
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::PdfDocument;
//!
//! let mut doc = PdfDocument::open("form.pdf")?;
//! doc.insert_text("Jane Doe", 1, 150.0, 212.0, 12.0)?;
//! doc.save("form_filled.pdf")?;
//! ```

mod document;
pub mod raster;
mod text;

pub use document::PdfDocument;
pub use text::{encode_literal_string, generate_text_operators};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Failed to rasterize page: {0}")]
    RasterError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
