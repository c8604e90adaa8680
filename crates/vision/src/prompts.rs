//! Prompt constants for field analysis

/// Field analysis prompt template. Replace `{data}` before sending.
pub const FIELD_ANALYSIS_PROMPT: &str = r#"I need to fill out this PDF form with the following data: {data}

Analyze the form image and identify where each piece of data should be placed. For every form field you can identify, provide:

1. The field name/label you see
2. The approximate coordinates (x, y) where text should be placed
3. The estimated width and height of the field
4. Which piece of the data should go in that field

Format your response as a JSON array like this:
[
  {
    "field_name": "First Name",
    "suggested_data": "John",
    "x": 150,
    "y": 200,
    "width": 200,
    "height": 25,
    "confidence": 0.9
  }
]

Coordinates are pixels from the top-left corner of the image. Use whole numbers for every coordinate and size. Focus on clear, fillable form fields and be precise with coordinates."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_has_data_placeholder() {
        assert!(FIELD_ANALYSIS_PROMPT.contains("{data}"));
    }
}
