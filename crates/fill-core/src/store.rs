//! Placement store

use crate::answers::AnswerSet;
use crate::matcher::match_field;
use crate::preview;
use crate::{FillError, Result};
use image::{DynamicImage, RgbaImage};
use pdf_core::PdfDocument;
use std::path::{Path, PathBuf};
use tracing::info;
use vision::FieldCandidate;

pub const DEFAULT_FIELD_WIDTH: u32 = 200;
pub const DEFAULT_FIELD_HEIGHT: u32 = 25;
const DEFAULT_FONT_SIZE: u32 = 12;

/// One text placement on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Display label (may be empty)
    pub field_name: String,
    /// Final resolved value to draw
    pub text: String,
    /// Top-left anchor in page pixels
    pub x: u32,
    pub y: u32,
    /// Bounding box size in pixels
    pub width: u32,
    pub height: u32,
    /// Draw size in points
    pub font_size: u32,
    /// Model-reported certainty, or 1.0 for manual entries
    pub confidence: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            field_name: String::new(),
            text: String::new(),
            x: 0,
            y: 0,
            width: DEFAULT_FIELD_WIDTH,
            height: 20,
            font_size: DEFAULT_FONT_SIZE,
            confidence: 0.0,
        }
    }
}

/// Ordered, mutable list of placements bound to one page of one document.
///
/// Starts empty; `populate` binds the page image and source path and fills
/// the list from model candidates. Display indices are 1-based; all
/// index-addressed operations here take the 0-based form.
#[derive(Default)]
pub struct PlacementStore {
    placements: Vec<Placement>,
    base_image: Option<RgbaImage>,
    source: Option<PathBuf>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Bind the analyzed page and build placements from model candidates.
    ///
    /// Each candidate's text is resolved through the field matcher against
    /// the supplied answers, falling back to the model's own suggestion.
    pub fn populate(
        &mut self,
        page: DynamicImage,
        source: impl Into<PathBuf>,
        candidates: Vec<FieldCandidate>,
        answers: &AnswerSet,
    ) -> &[Placement] {
        self.base_image = Some(page.to_rgba8());
        self.source = Some(source.into());
        self.placements = candidates
            .into_iter()
            .map(|candidate| {
                let text = match_field(&candidate.field_name, answers, &candidate.suggested_data);
                Placement {
                    field_name: candidate.field_name,
                    text,
                    x: candidate.x,
                    y: candidate.y,
                    width: candidate.width,
                    height: candidate.height,
                    font_size: DEFAULT_FONT_SIZE,
                    confidence: candidate.confidence,
                }
            })
            .collect();
        info!("populated {} placements", self.placements.len());
        &self.placements
    }

    /// Append a manual placement with the default box size.
    ///
    /// Manual entries are trusted fully: confidence is 1.0.
    pub fn add(&mut self, field_name: &str, text: &str, x: u32, y: u32) {
        self.add_sized(field_name, text, x, y, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
    }

    /// Append a manual placement with an explicit box size
    pub fn add_sized(
        &mut self,
        field_name: &str,
        text: &str,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) {
        self.placements.push(Placement {
            field_name: field_name.to_string(),
            text: text.to_string(),
            x,
            y,
            width,
            height,
            font_size: DEFAULT_FONT_SIZE,
            confidence: 1.0,
        });
        info!("added placement: {field_name} at ({x}, {y})");
    }

    /// Overwrite the supplied fields of one placement in place.
    ///
    /// An out-of-range index is a silent no-op.
    pub fn adjust(
        &mut self,
        index: usize,
        x: Option<u32>,
        y: Option<u32>,
        width: Option<u32>,
        height: Option<u32>,
    ) {
        if let Some(placement) = self.placements.get_mut(index) {
            if let Some(x) = x {
                placement.x = x;
            }
            if let Some(y) = y {
                placement.y = y;
            }
            if let Some(width) = width {
                placement.width = width;
            }
            if let Some(height) = height {
                placement.height = height;
            }
            info!("adjusted placement {index}: {}", placement.field_name);
        }
    }

    /// Delete and return one placement.
    ///
    /// An out-of-range index is a silent no-op returning `None`.
    pub fn remove(&mut self, index: usize) -> Option<Placement> {
        if index < self.placements.len() {
            let removed = self.placements.remove(index);
            info!("removed placement: {}", removed.field_name);
            Some(removed)
        } else {
            None
        }
    }

    /// Render the placement preview.
    ///
    /// Without a bound page image this returns a blank white canvas; with a
    /// bound image and no placements, the base image unchanged.
    pub fn render(&self, show_labels: bool) -> RgbaImage {
        let Some(base) = &self.base_image else {
            return preview::blank_canvas();
        };
        if self.placements.is_empty() {
            return base.clone();
        }
        preview::compose(base, &self.placements, show_labels)
    }

    /// Render and write the preview image
    pub fn save_preview<P: AsRef<Path>>(&self, path: P, show_labels: bool) -> Result<()> {
        let rendered = self.render(show_labels);
        rendered
            .save(path.as_ref())
            .map_err(|e| FillError::PreviewError(e.to_string()))?;
        info!("preview saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Write every placement's text into the source document.
    ///
    /// Text lands at `(x, y + font_size)` so the given y reads as the top
    /// of the text rather than its baseline. Requires a bound source
    /// document and at least one placement.
    pub fn commit<P: AsRef<Path>>(&self, output: P) -> Result<PathBuf> {
        let source = self.source.as_ref().ok_or(FillError::NoDocument)?;
        if self.placements.is_empty() {
            return Err(FillError::NoPlacements);
        }

        let mut doc = PdfDocument::open(source)?;
        for placement in &self.placements {
            doc.insert_text(
                &placement.text,
                1,
                placement.x as f64,
                (placement.y + placement.font_size) as f64,
                placement.font_size as f32,
            )?;
        }
        doc.save(output.as_ref())?;

        info!("filled PDF saved to {}", output.as_ref().display());
        Ok(output.as_ref().to_path_buf())
    }
}
