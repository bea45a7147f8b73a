//! Field diffs for audit entries

use serde_json::Value;

/// Summarize top-level field changes between two JSON objects
///
/// Returns `None` when nothing changed. Non-object values are compared whole.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes: Vec<String> = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let changed_or_removed = before_obj.iter().filter_map(|(key, old)| {
                match after_obj.get(key) {
                    Some(new) if new == old => None,
                    Some(new) => Some(format!("{}: {} -> {}", key, format_value(old), format_value(new))),
                    None => Some(format!("{}: {} -> (removed)", key, format_value(old))),
                }
            });
            let added = after_obj
                .iter()
                .filter(|(key, _)| !before_obj.contains_key(*key))
                .map(|(key, new)| format!("{}: (added) -> {}", key, format_value(new)));

            changed_or_removed.chain(added).collect()
        }
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finalize_diff() {
        let before = json!({"status": "DRAFT", "lines": [1, 2]});
        let after = json!({"status": "FINALIZED", "lines": [1, 2], "finalized_by": "abc"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("status: \"DRAFT\" -> \"FINALIZED\""));
        assert!(diff.contains("finalized_by: (added) -> \"abc\""));
        assert!(!diff.contains("lines"));
    }

    #[test]
    fn test_removed_field() {
        let before = json!({"unsettled": [1]});
        let after = json!({});
        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "unsettled: [1 items] -> (removed)");
    }

    #[test]
    fn test_no_changes() {
        let value = json!({"status": "DRAFT"});
        assert!(generate_diff(&value, &value).is_none());
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(generate_diff(&json!(1), &json!(2)).unwrap(), "1 -> 2");
        assert!(generate_diff(&json!(null), &json!(null)).is_none());
    }

    #[test]
    fn test_long_strings_are_truncated() {
        let before = json!({"description": "x".repeat(80)});
        let after = json!({"description": "short"});
        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("...\""));
    }
}
