//! Answer set loading and reformatting

use crate::{FillError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// Ordered mapping from field key to value.
///
/// Insertion order is load-bearing: the matcher's substring pass returns
/// the first key that matches, in this order.
pub type AnswerSet = IndexMap<String, String>;

/// Load answers from a JSON file.
///
/// Accepts either a bare object of field/value pairs or an object nesting
/// them under a `collected_answers` key.
pub fn load_answers_file<P: AsRef<Path>>(path: P) -> Result<AnswerSet> {
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    match value.get("collected_answers") {
        Some(nested) => answers_from_value(nested),
        None => answers_from_value(&value),
    }
}

/// Load answers from a JSON file, requiring the `collected_answers` key.
pub fn load_collected_answers<P: AsRef<Path>>(path: P) -> Result<AnswerSet> {
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    let nested = value
        .get("collected_answers")
        .ok_or(FillError::MissingCollectedAnswers)?;
    answers_from_value(nested)
}

fn answers_from_value(value: &Value) -> Result<AnswerSet> {
    let object = value.as_object().ok_or(FillError::InvalidShape)?;
    Ok(object
        .iter()
        .map(|(key, value)| (key.clone(), value_to_string(value)))
        .collect())
}

/// Parse answers from a delimited string.
///
/// Pairs are separated by `", "` and split on the first `:`; pairs with no
/// colon are dropped.
pub fn parse_answer_string(input: &str) -> AnswerSet {
    let mut answers = AnswerSet::new();
    for pair in input.split(", ") {
        if let Some((key, value)) = pair.split_once(':') {
            answers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    answers
}

/// Convert a JSON value to a string for placement
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Turn an underscored key into a display heading, e.g. `date_of_birth`
/// into `Date Of Birth`.
pub fn title_case(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format answers as a single `Key: Value, ...` string with display headings
pub fn format_as_string(answers: &AnswerSet) -> String {
    answers
        .iter()
        .map(|(key, value)| format!("{}: {}", title_case(key), value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Summarize answers for the model prompt, keys kept verbatim
pub fn summarize(answers: &AnswerSet) -> String {
    answers
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write answers to a `Field,Value` CSV file
pub fn write_csv<P: AsRef<Path>>(answers: &AnswerSet, path: P) -> Result<()> {
    let mut out = String::from("Field,Value\n");
    for (key, value) in answers {
        out.push_str(&csv_field(&title_case(key)));
        out.push(',');
        out.push_str(&csv_field(value));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_answer_string() {
        let answers = parse_answer_string("Name: John Doe, Email: john@example.com");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers["Name"], "John Doe");
        assert_eq!(answers["Email"], "john@example.com");
    }

    #[test]
    fn test_parse_answer_string_keeps_order() {
        let answers = parse_answer_string("Zip: 90210, Address: 1 Main St");
        let keys: Vec<&String> = answers.keys().collect();
        assert_eq!(keys, ["Zip", "Address"]);
    }

    #[test]
    fn test_parse_answer_string_value_with_colon() {
        let answers = parse_answer_string("Note: time: 10:30");
        assert_eq!(answers["Note"], "time: 10:30");
    }

    #[test]
    fn test_parse_answer_string_drops_pairs_without_colon() {
        let answers = parse_answer_string("Name: Jane, garbage, Email: a@b");
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("date_of_birth"), "Date Of Birth");
        assert_eq!(title_case("name"), "Name");
        assert_eq!(title_case("EMAIL"), "Email");
    }

    #[test]
    fn test_format_as_string() {
        let mut answers = AnswerSet::new();
        answers.insert("full_name".to_string(), "Jane Doe".to_string());
        answers.insert("email".to_string(), "jane@example.com".to_string());
        assert_eq!(
            format_as_string(&answers),
            "Full Name: Jane Doe, Email: jane@example.com"
        );
    }

    #[test]
    fn test_summarize_keeps_keys_verbatim() {
        let mut answers = AnswerSet::new();
        answers.insert("full_name".to_string(), "Jane".to_string());
        assert_eq!(summarize(&answers), "full_name: Jane");
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&serde_json::json!("hello")), "hello");
        assert_eq!(value_to_string(&serde_json::json!(42)), "42");
        assert_eq!(value_to_string(&serde_json::json!(true)), "true");
        assert_eq!(value_to_string(&serde_json::json!(null)), "");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
