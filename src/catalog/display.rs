//! Extracting display fields from tool output.

use serde_json::Value;

use super::definition::DisplayField;

/// A labelled value pulled from a run's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValue {
    pub label: String,
    pub value: String,
}

/// Pull `fields` out of a tool's JSON stdout.
///
/// Tools often print progress lines before the JSON document, so when the
/// whole output does not parse, the text from the first `{` or `[` is tried.
/// Fields whose path is missing are skipped.
pub fn extract_display_values(fields: &[DisplayField], stdout: &str) -> Vec<DisplayValue> {
    if fields.is_empty() {
        return Vec::new();
    }
    let Some(doc) = parse_json_output(stdout) else {
        return Vec::new();
    };

    fields
        .iter()
        .filter_map(|field| {
            lookup_path(&doc, &field.key).map(|value| DisplayValue {
                label: field.label.clone(),
                value: render(value),
            })
        })
        .collect()
}

fn parse_json_output(stdout: &str) -> Option<Value> {
    let trimmed = stdout.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    let start = trimmed.find(['{', '['])?;
    serde_json::from_str(&trimmed[start..]).ok()
}

fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(doc, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str, label: &str) -> DisplayField {
        DisplayField {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn extracts_nested_fields() {
        let stdout = r#"{"score": 0.42, "co2": {"grams": 1.8, "unit": "g"}, "pages": [{"url": "/"}]}"#;
        let fields = vec![
            field("score", "Score"),
            field("co2.grams", "CO2"),
            field("pages.0.url", "First page"),
        ];

        let values = extract_display_values(&fields, stdout);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].value, "0.42");
        assert_eq!(values[1].value, "1.8");
        assert_eq!(values[2].value, "/");
    }

    #[test]
    fn skips_missing_fields() {
        let values = extract_display_values(&[field("absent.path", "Nope")], r#"{"a": 1}"#);
        assert!(values.is_empty());
    }

    #[test]
    fn tolerates_leading_log_lines() {
        let stdout = "Analyzing...\nDone.\n{\"total\": 12}";
        let values = extract_display_values(&[field("total", "Total")], stdout);
        assert_eq!(values[0].value, "12");
    }

    #[test]
    fn non_json_output_yields_nothing() {
        let values = extract_display_values(&[field("total", "Total")], "plain text");
        assert!(values.is_empty());
    }
}
