//! PDF page rasterization
//!
//! Pages are rendered through a pdfium binding; everything downstream of
//! this module only ever sees an `image::DynamicImage`.

use crate::{PdfError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;

/// Render a single page of a PDF document to an image.
///
/// # Arguments
/// * `path` - Path to the PDF file
/// * `page` - Page number (1-indexed)
/// * `dpi` - Target resolution in dots per inch
pub fn rasterize_page<P: AsRef<Path>>(path: P, page: usize, dpi: f32) -> Result<DynamicImage> {
    if page == 0 {
        return Err(PdfError::InvalidPage(page, 0));
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PdfError::RasterError(e.to_string()))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_file(path.as_ref(), None)
        .map_err(|e| PdfError::OpenError(e.to_string()))?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    if page > page_count {
        return Err(PdfError::InvalidPage(page, page_count));
    }

    let target = pages
        .get((page - 1) as u16)
        .map_err(|e| PdfError::RasterError(e.to_string()))?;

    let config = PdfRenderConfig::new().scale_page_by_factor(dpi / 72.0);
    let bitmap = target
        .render_with_config(&config)
        .map_err(|e| PdfError::RasterError(e.to_string()))?;

    Ok(bitmap.as_image())
}
