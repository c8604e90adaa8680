//! Fill Core - field matching and placement management
//!
//! This crate holds the local logic of the fill workflow:
//! - [`answers`]: loading and reformatting the caller's answer set
//! - [`match_field`]: the keyword heuristic mapping a model-identified
//!   field label to one of the supplied answer values
//! - [`PlacementStore`]: the ordered, mutable list of text placements,
//!   with preview rendering and the final PDF write
//!
//! # Example
//!
//! ```ignore
//! use fill_core::PlacementStore;
//!
//! let mut store = PlacementStore::new();
//! store.populate(page_image, "form.pdf", candidates, &answers);
//! store.save_preview("form_preview.png", true)?;
//! store.commit("form_filled.pdf")?;
//! ```

pub mod answers;
mod matcher;
mod preview;
mod store;

pub use answers::AnswerSet;
pub use matcher::match_field;
pub use store::{Placement, PlacementStore, DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH};

use thiserror::Error;

/// Errors that can occur in the fill workflow
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Failed to read answers: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("'collected_answers' key not found in JSON data")]
    MissingCollectedAnswers,

    #[error("Answers JSON must be an object of field/value pairs")]
    InvalidShape,

    #[error("No document loaded")]
    NoDocument,

    #[error("No placements to write")]
    NoPlacements,

    #[error("Failed to save preview: {0}")]
    PreviewError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),
}

/// Result type for fill operations
pub type Result<T> = std::result::Result<T, FillError>;
