//! Isolate and parse the JSON object embedded in free-form model output.
//!
//! Models often wrap JSON in commentary or code fences. The extractor takes
//! the substring from the first `{` to the last `}` (inclusive) and parses
//! it; it is a tolerance layer, not a strict parser.

use serde_json::Value;

use crate::error::MalformedResponseError;

/// Extract the outermost JSON object from `raw`.
pub fn extract_json(raw: &str) -> Result<Value, MalformedResponseError> {
    let text = raw.trim();
    let start = text.find('{').ok_or(MalformedResponseError::NoOpeningBrace)?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or(MalformedResponseError::NoClosingBrace)?;
    Ok(serde_json::from_str(&text[start..=end])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let value = extract_json(r#"{"title": "Trip"}"#).unwrap();
        assert_eq!(value["title"], "Trip");
    }

    #[test]
    fn strips_commentary_and_code_fences() {
        let raw = "Sure! Here is your plan:\n```json\n{\"days\": [{\"day_number\": 1}]}\n```\nEnjoy your trip!";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["days"][0]["day_number"], 1);
    }

    #[test]
    fn keeps_nested_braces() {
        let raw = r#"x {"a": {"b": {"c": 1}}} y"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["a"]["b"]["c"], 1);
    }

    #[test]
    fn no_opening_brace() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(err, MalformedResponseError::NoOpeningBrace), "got: {err}");
    }

    #[test]
    fn empty_text_has_no_opening_brace() {
        let err = extract_json("   ").unwrap_err();
        assert!(matches!(err, MalformedResponseError::NoOpeningBrace), "got: {err}");
    }

    #[test]
    fn no_closing_brace_after_opening() {
        let err = extract_json("} then {\"title\": \"cut off").unwrap_err();
        assert!(matches!(err, MalformedResponseError::NoClosingBrace), "got: {err}");
    }

    #[test]
    fn invalid_json_between_braces() {
        let err = extract_json("{title: Trip, days: [}").unwrap_err();
        assert!(matches!(err, MalformedResponseError::InvalidJson(_)), "got: {err}");
    }

    #[test]
    fn two_objects_do_not_parse_as_one() {
        let err = extract_json(r#"{"a": 1} and {"b": 2}"#).unwrap_err();
        assert!(matches!(err, MalformedResponseError::InvalidJson(_)), "got: {err}");
    }
}
