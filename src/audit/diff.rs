//! Diff summaries for audit entries
//!
//! Expense records only ever change status, so top-level field comparison
//! is all the audit log needs.

use serde::Serialize;
use serde_json::Value;

/// One changed top-level field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.before, self.after)
    }
}

/// Top-level fields that differ between two JSON objects, in field order
pub fn changed_fields(before: &Value, after: &Value) -> Vec<FieldChange> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        if before == after {
            return Vec::new();
        }
        return vec![FieldChange {
            field: "value".into(),
            before: format_value(before),
            after: format_value(after),
        }];
    };

    let mut changes: Vec<FieldChange> = before_obj
        .iter()
        .filter_map(|(key, b)| {
            let a = after_obj.get(key);
            (a != Some(b)).then(|| FieldChange {
                field: key.clone(),
                before: format_value(b),
                after: a.map(format_value).unwrap_or_else(|| "(removed)".into()),
            })
        })
        .collect();

    changes.extend(
        after_obj
            .iter()
            .filter(|(key, _)| !before_obj.contains_key(*key))
            .map(|(key, a)| FieldChange {
                field: key.clone(),
                before: "(added)".into(),
                after: format_value(a),
            }),
    );

    changes
}

/// Human-readable summary of what changed between two entity states
pub fn generate_diff<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let before = serde_json::to_value(before).ok()?;
    let after = serde_json::to_value(after).ok()?;

    let changes = changed_fields(&before, &after);
    if changes.is_empty() {
        None
    } else {
        Some(
            changes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
