//! Text operator generation

/// Encode text as a PDF literal string, parentheses included.
///
/// The overlay font uses WinAnsiEncoding, which tracks Latin-1 over the
/// printable range; code points past U+00FF have no slot and degrade to `?`.
pub fn encode_literal_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        match c {
            '\\' => out.extend_from_slice(b"\\\\"),
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 256 => out.push(c as u8),
            _ => out.push(b'?'),
        }
    }
    out.push(b')');
    out
}

/// Generate PDF operators for text insertion
///
/// Creates the proper PDF text operators (BT, Tf, Td, Tj, ET) to render
/// black text at a specific position.
///
/// # Arguments
/// * `text` - Text to render
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `font_size` - Font size in points
/// * `font_resource` - PDF font resource name (e.g., "F1")
pub fn generate_text_operators(
    text: &str,
    x: f64,
    y: f64,
    font_size: f32,
    font_resource: &str,
) -> Vec<u8> {
    let mut ops = Vec::new();

    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(b"0 0 0 rg\n");
    ops.extend_from_slice(format!("/{font_resource} {font_size} Tf\n").as_bytes());
    ops.extend_from_slice(format!("{x} {y} Td\n").as_bytes());
    ops.extend_from_slice(&encode_literal_string(text));
    ops.extend_from_slice(b" Tj\nET\n");

    ops
}
