//! Lenient decoding of JSON returned by the model.

use serde::de::DeserializeOwned;

use scribe_core::{Error, Result};

/// Strip markdown code fences and any prose around the outermost JSON
/// object or array.
pub fn extract_json(raw: &str) -> &str {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = cleaned.find(['{', '[']);
    let end = cleaned.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if e > s => &cleaned[s..=e],
        _ => cleaned,
    }
}

/// Decode `raw` as `T`, tolerating fences and leading prose.
pub fn parse_json_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    if let Ok(v) = serde_json::from_str::<T>(raw) {
        return Ok(v);
    }
    serde_json::from_str::<T>(extract_json(raw))
        .map_err(|e| Error::Serialization(format!("Model returned invalid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        a: i32,
    }

    #[test]
    fn test_plain_json() {
        let s: Sample = parse_json_lenient(r#"{"a": 1}"#).unwrap();
        assert_eq!(s, Sample { a: 1 });
    }

    #[test]
    fn test_fenced_json() {
        let s: Sample = parse_json_lenient("```json\n{\"a\": 2}\n```").unwrap();
        assert_eq!(s.a, 2);
    }

    #[test]
    fn test_leading_prose() {
        let s: Sample = parse_json_lenient("Sure! Here you go:\n{\"a\": 3}\nEnjoy.").unwrap();
        assert_eq!(s.a, 3);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = parse_json_lenient::<Sample>("not json at all").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_extract_array() {
        assert_eq!(extract_json("ideas: [\"x\", \"y\"]"), "[\"x\", \"y\"]");
    }
}
