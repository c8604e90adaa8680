//! PDF Document wrapper

use crate::text::generate_text_operators;
use crate::{PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

/// PDF Document wrapper providing high-level text stamping
///
/// Text is buffered per page during insertion and written out in a single
/// pass at save time, together with the overlay font resource.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Font resource name reserved for stamped text, per page
    page_font_resources: HashMap<usize, String>,
    /// Overlay font object, created lazily on first save
    overlay_font_id: Option<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::wrap(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::wrap(inner))
    }

    fn wrap(inner: Document) -> Self {
        Self {
            inner,
            page_content_buffer: HashMap::new(),
            page_font_resources: HashMap::new(),
            overlay_font_id: None,
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from top)
    /// * `font_size` - Font size in points
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f32,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        // Convert Y coordinate from top-origin to PDF bottom-origin
        let page_height = self.get_page_height(page)?;
        let pdf_y = page_height - y;

        let font_resource = self.reserve_font_resource(page)?;
        let operators = generate_text_operators(text, x, pdf_y, font_size, &font_resource);

        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(&operators);

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.finalize()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Flush buffered text and attach the overlay font to touched pages
    fn finalize(&mut self) -> Result<()> {
        self.flush_content_buffers()?;
        self.attach_font_resources()?;
        Ok(())
    }

    /// Reserve a font resource name for a page
    ///
    /// Picks the first `F{n}` name not already present in the page's Font
    /// dictionary, so stamped text never shadows an existing resource.
    fn reserve_font_resource(&mut self, page: usize) -> Result<String> {
        if let Some(name) = self.page_font_resources.get(&page) {
            return Ok(name.clone());
        }

        let existing = self.existing_font_names(page)?;
        let mut counter = 1;
        while existing.contains(&format!("F{counter}")) {
            counter += 1;
        }
        let name = format!("F{counter}");

        self.page_font_resources.insert(page, name.clone());
        Ok(name)
    }

    /// Collect the font resource names already registered on a page
    fn existing_font_names(&self, page: usize) -> Result<Vec<String>> {
        let page_dict = self.page_dict(page)?;
        let mut names = Vec::new();

        if let Ok(resources) = page_dict.get(b"Resources") {
            if let Some(resources) = self.resolve_dict(resources) {
                if let Ok(fonts) = resources.get(b"Font") {
                    if let Some(fonts) = self.resolve_dict(fonts) {
                        for (key, _) in fonts.iter() {
                            names.push(String::from_utf8_lossy(key).into_owned());
                        }
                    }
                }
            }
        }

        Ok(names)
    }

    /// Resolve a dictionary that may be inline or behind a reference
    fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        match object {
            Object::Dictionary(dict) => Some(dict),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|resolved| resolved.as_dict().ok()),
            _ => None,
        }
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    fn page_dict(&self, page: usize) -> Result<&Dictionary> {
        let page_id = self.page_id(page)?;
        self.inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Get page height in points
    ///
    /// Extracts the page height from the MediaBox or CropBox, following the
    /// parent inheritance chain if needed.
    fn get_page_height(&self, page: usize) -> Result<f64> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }
        let y1 = object_as_f64(&media_box[1])
            .ok_or_else(|| PdfError::ParseError("Invalid MediaBox y1".to_string()))?;
        let y2 = object_as_f64(&media_box[3])
            .ok_or_else(|| PdfError::ParseError("Invalid MediaBox y2".to_string()))?;

        Ok(y2 - y1)
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        // The walk is capped to guard against cyclic page trees
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                return match media_box {
                    Object::Array(array) => Ok(array.clone()),
                    Object::Reference(id) => Ok(self
                        .inner
                        .get_object(*id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone()),
                    _ => Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ])
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// Handles single streams, references, and arrays of streams by
    /// concatenating them into one new stream object.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let (mut combined, mut page_dict) = {
            let dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
            (self.collect_page_content(dict), dict.clone())
        };

        // A separator keeps the stamped operators off the tail of any
        // existing operator that ends without whitespace
        combined.push(b'\n');
        combined.extend_from_slice(content);

        let stream_id = self.inner.add_object(Stream::new(Dictionary::new(), combined));
        page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Concatenate a page's existing content stream data
    fn collect_page_content(&self, page_dict: &Dictionary) -> Vec<u8> {
        let mut combined = Vec::new();
        let Ok(contents) = page_dict.get(b"Contents") else {
            return combined;
        };

        match contents {
            Object::Stream(stream) => append_stream(&mut combined, stream),
            Object::Reference(id) => {
                if let Ok(Object::Stream(stream)) = self.inner.get_object(*id) {
                    append_stream(&mut combined, stream);
                }
            }
            Object::Array(parts) => {
                for part in parts {
                    match part {
                        Object::Reference(id) => {
                            if let Ok(Object::Stream(stream)) = self.inner.get_object(*id) {
                                append_stream(&mut combined, stream);
                            }
                        }
                        Object::Stream(stream) => append_stream(&mut combined, stream),
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        combined
    }

    /// Add the overlay font to every page that received stamped text
    fn attach_font_resources(&mut self) -> Result<()> {
        if self.page_font_resources.is_empty() {
            return Ok(());
        }

        let font_id = self.ensure_overlay_font();
        let assignments: Vec<(usize, String)> = self.page_font_resources.drain().collect();

        for (page, resource_name) in assignments {
            self.add_font_to_page_resources(page, &resource_name, font_id)?;
        }

        Ok(())
    }

    /// Get or create the overlay font object
    ///
    /// The built-in Helvetica base font needs no embedded font program.
    fn ensure_overlay_font(&mut self) -> ObjectId {
        if let Some(id) = self.overlay_font_id {
            return id;
        }

        let id = self.inner.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.overlay_font_id = Some(id);
        id
    }

    /// Register the overlay font in a page's Resources dictionary
    fn add_font_to_page_resources(
        &mut self,
        page: usize,
        resource_name: &str,
        font_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?
            .clone();

        let mut resources = match page_dict.get(b"Resources") {
            Ok(object) => self.resolve_dict(object).cloned().unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };
        let mut fonts = match resources.get(b"Font") {
            Ok(object) => self.resolve_dict(object).cloned().unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        fonts.set(resource_name.as_bytes(), Object::Reference(font_id));
        resources.set(b"Font", Object::Dictionary(fonts));

        let mut new_page_dict = page_dict;
        new_page_dict.set(b"Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

fn append_stream(buffer: &mut Vec<u8>, stream: &Stream) {
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    buffer.extend_from_slice(&data);
    buffer.push(b'\n');
}

fn object_as_f64(object: &Object) -> Option<f64> {
    object
        .as_f32()
        .map(|v| v as f64)
        .ok()
        .or_else(|| object.as_i64().ok().map(|v| v as f64))
}
