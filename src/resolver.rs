use crate::messages::MessageSet;
use serde_json::Value;

/// Outcome of looking a key up in the active messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Text(String),
    /// Every message stored under `key.0`, `key.1`, ... in mapping order.
    List(Vec<String>),
}

impl Resolved {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Resolved::Text(text.clone())),
            Value::Array(items) => Some(Resolved::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            )),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Resolved::Text(text) => Value::String(text.clone()),
            Resolved::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Look `key` up in `messages`.
///
/// Keys may use `/` instead of `.` as separator. A key with no message of its
/// own but with a `key.0` entry resolves to the list of all its children.
/// A missing key resolves to itself, minus `default_key_prefix` when it starts
/// with it. Lists and fallbacks are written back into `messages` so later
/// lookups of the same key are direct hits.
pub fn resolve(
    key: &str,
    messages: &mut MessageSet,
    default_key_prefix: Option<&str>,
) -> Resolved {
    let mut key = key.to_string();
    if !messages.has_value(&key) && !messages.has_value(&format!("{}.0", key)) {
        key = key.replace('/', ".");
    }

    if let Some(resolved) = messages.get_value(&key).and_then(Resolved::from_value) {
        return resolved;
    }

    let resolved = if messages.has_value(&format!("{}.0", key)) {
        let prefix = format!("{}.", key);
        Resolved::List(
            messages
                .iter()
                .filter(|(child, _)| child.starts_with(&prefix))
                .filter_map(|(_, value)| value.as_str().map(str::to_owned))
                .collect(),
        )
    } else {
        let display = default_key_prefix
            .and_then(|prefix| key.strip_prefix(prefix))
            .unwrap_or(&key);
        Resolved::Text(display.to_string())
    };

    messages.set_value(&key, resolved.to_value());
    resolved
}
