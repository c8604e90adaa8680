//! Model response schema and extraction

use crate::{Result, VisionError};
use serde::Deserialize;

/// One form field proposed by the model
///
/// Missing size and confidence fields take the documented defaults; a
/// candidate with a missing or out-of-domain coordinate fails the whole
/// array, which callers treat as zero fields detected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldCandidate {
    /// Field label as read off the page
    pub field_name: String,
    /// Value the model suggests for the field (may be empty)
    #[serde(default)]
    pub suggested_data: String,
    /// Top-left X in page pixels
    pub x: u32,
    /// Top-left Y in page pixels
    pub y: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Model-reported certainty in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_width() -> u32 {
    200
}

fn default_height() -> u32 {
    25
}

fn default_confidence() -> f32 {
    0.5
}

/// Locate the JSON array inside free-form model text.
///
/// The model is asked for bare JSON but tends to wrap it in prose; the span
/// from the first `[` to the last `]` is taken as the array.
pub fn extract_json_array(text: &str) -> Result<&str> {
    let start = text.find('[').ok_or(VisionError::MissingArray)?;
    let end = text.rfind(']').ok_or(VisionError::MissingArray)?;
    if end < start {
        return Err(VisionError::MissingArray);
    }
    Ok(&text[start..=end])
}

/// Parse the candidate array out of a raw model response.
pub fn parse_candidates(text: &str) -> Result<Vec<FieldCandidate>> {
    let json = extract_json_array(text)?;
    serde_json::from_str(json).map_err(|e| VisionError::Malformed(e.to_string()))
}
