use crate::error::ParseError;
use serde_json::{Map, Value};

/// Suggestion objects exactly as the provider wrote them.
pub type RawSuggestionArray = Vec<Map<String, Value>>;

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Slice from the first `{` to the last `}` of the de-fenced text.
pub fn extract_json_object(raw: &str) -> Result<String, ParseError> {
    let cleaned = strip_code_fences(raw);
    let start = cleaned.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = cleaned.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }
    Ok(cleaned[start..=end].to_string())
}

/// Strict JSON first; JSON5 second, for trailing commas, comments and
/// single-quoted strings that models like to emit.
pub fn parse_object(raw: &str) -> Result<Value, ParseError> {
    let slice = extract_json_object(raw)?;
    match serde_json::from_str::<Value>(&slice) {
        Ok(value) => Ok(value),
        Err(strict_err) => json5::from_str::<Value>(&slice)
            .map_err(|_| ParseError::InvalidJson(strict_err.to_string())),
    }
}

fn take_list(value: Value, field: &'static str) -> Result<Vec<Value>, ParseError> {
    match value {
        Value::Object(mut obj) => match obj.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ParseError::MissingList { field }),
        },
        _ => Err(ParseError::MissingList { field }),
    }
}

pub fn parse_suggestions(raw: &str) -> Result<RawSuggestionArray, ParseError> {
    let items = take_list(parse_object(raw)?, "suggestions")?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(ParseError::BadEntry {
                field: "suggestions",
                index,
            }),
        })
        .collect()
}

pub fn parse_categories(raw: &str) -> Result<Vec<String>, ParseError> {
    let items = take_list(parse_object(raw)?, "categories")?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s),
            _ => Err(ParseError::BadEntry {
                field: "categories",
                index,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{extract_json_object, parse_categories, parse_suggestions};
    use crate::error::ParseError;

    #[test]
    fn text_without_braces_is_rejected() {
        assert_eq!(
            parse_suggestions("Sorry, I cannot help with that."),
            Err(ParseError::NoJsonObject)
        );
        assert_eq!(parse_suggestions("} backwards {"), Err(ParseError::NoJsonObject));
        assert_eq!(parse_suggestions("only { opening"), Err(ParseError::NoJsonObject));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "Here you go:\n```json\n{\"suggestions\": [{\"id\": \"a\"}, {\"id\": \"b\"}]}\n```\nEnjoy!";
        let got = parse_suggestions(raw).expect("fenced json should parse");
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].get("id").and_then(|v| v.as_str()), Some("a"));
    }

    #[test]
    fn lenient_pass_accepts_trailing_commas() {
        let raw = "{\"suggestions\": [{\"id\": \"a\", \"roi\": 120,},],}";
        let got = parse_suggestions(raw).expect("json5 pass should accept trailing commas");
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn garbage_between_braces_is_invalid_json() {
        let got = parse_suggestions("{ this is not json at all }");
        assert!(matches!(got, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn missing_or_non_list_suggestions_is_rejected() {
        assert_eq!(
            parse_suggestions("{\"ideas\": []}"),
            Err(ParseError::MissingList {
                field: "suggestions"
            })
        );
        assert_eq!(
            parse_suggestions("{\"suggestions\": {\"id\": \"1\"}}"),
            Err(ParseError::MissingList {
                field: "suggestions"
            })
        );
    }

    #[test]
    fn non_object_entries_are_rejected() {
        assert_eq!(
            parse_suggestions("{\"suggestions\": [{\"id\": \"1\"}, \"oops\"]}"),
            Err(ParseError::BadEntry {
                field: "suggestions",
                index: 1
            })
        );
    }

    #[test]
    fn empty_suggestion_list_is_valid_shape() {
        let got = parse_suggestions("{\"suggestions\": []}").expect("empty list is a list");
        assert!(got.is_empty());
    }

    #[test]
    fn extraction_spans_first_to_last_brace() {
        let got = extract_json_object("pre {\"a\": {\"b\": 1}} post").expect("object");
        assert_eq!(got, "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn categories_parse_string_list() {
        let got = parse_categories("```\n{\"categories\": [\"Bottles\", \"Bags\", \"Toys\"]}\n```")
            .expect("categories should parse");
        assert_eq!(got, vec!["Bottles", "Bags", "Toys"]);
    }
}
