//! Preview compositing
//!
//! Draws placement boxes, text, and numbered labels over a copy of the
//! rasterized page. Box colors follow the confidence tier of each
//! placement so low-confidence guesses stand out for correction.

use crate::store::Placement;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

const HIGH_TIER: Rgba<u8> = Rgba([0, 255, 0, 128]);
const MEDIUM_TIER: Rgba<u8> = Rgba([255, 255, 0, 128]);
const LOW_TIER: Rgba<u8> = Rgba([255, 0, 0, 128]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);
const OUTLINE_WIDTH: u32 = 2;
/// font8x8 glyph cell size in pixels
const GLYPH_SIZE: u32 = 8;

/// Box color for a confidence value
pub fn tier_color(confidence: f32) -> Rgba<u8> {
    if confidence > 0.8 {
        HIGH_TIER
    } else if confidence > 0.5 {
        MEDIUM_TIER
    } else {
        LOW_TIER
    }
}

/// Blank white canvas returned when no page image is bound
pub fn blank_canvas() -> RgbaImage {
    RgbaImage::from_pixel(800, 600, Rgba([255, 255, 255, 255]))
}

/// Composite placements over the base page image.
///
/// Placements draw in store order, so later entries paint over earlier
/// ones where boxes overlap.
pub fn compose(base: &RgbaImage, placements: &[Placement], show_labels: bool) -> RgbaImage {
    let mut canvas = base.clone();

    for (i, placement) in placements.iter().enumerate() {
        let color = tier_color(placement.confidence);
        let outline = Rgba([color[0], color[1], color[2], 255]);

        fill_rect(
            &mut canvas,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            color,
        );
        outline_rect(
            &mut canvas,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            outline,
        );
        draw_text(
            &mut canvas,
            &placement.text,
            placement.x + 2,
            placement.y + 2,
            TEXT_COLOR,
        );

        if show_labels {
            let label = format!("{}. {}", i + 1, placement.field_name);
            // Above the box when there is vertical room, below it otherwise
            let label_y = if placement.y > 15 {
                placement.y - 15
            } else {
                placement.y + placement.height + 2
            };
            draw_text(&mut canvas, &label, placement.x, label_y, LABEL_COLOR);
        }
    }

    canvas
}

/// Stamp text using the 8x8 bitmap font, one glyph cell per character
pub fn draw_text(canvas: &mut RgbaImage, text: &str, x: u32, y: u32, color: Rgba<u8>) {
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8u32 {
                    if bits & (1 << col) != 0 {
                        set_pixel(canvas, cursor + col, y + row as u32, color);
                    }
                }
            }
        }
        cursor += GLYPH_SIZE;
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    for dy in 0..height {
        for dx in 0..width {
            blend_pixel(canvas, x + dx, y + dy, color);
        }
    }
}

fn outline_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    for band in 0..OUTLINE_WIDTH {
        for dx in 0..width {
            set_pixel(canvas, x + dx, y + band, color);
            set_pixel(canvas, x + dx, (y + height).saturating_sub(band + 1), color);
        }
        for dy in 0..height {
            set_pixel(canvas, x + band, y + dy, color);
            set_pixel(canvas, (x + width).saturating_sub(band + 1), y + dy, color);
        }
    }
}

/// Alpha-blend one pixel; out-of-bounds coordinates are dropped
fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let alpha = color[3] as u32;
    let pixel = canvas.get_pixel_mut(x, y);
    for channel in 0..3 {
        let over = color[channel] as u32;
        let under = pixel[channel] as u32;
        pixel[channel] = ((over * alpha + under * (255 - alpha)) / 255) as u8;
    }
    pixel[3] = 255;
}

/// Overwrite one pixel; out-of-bounds coordinates are dropped
fn set_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}
