use crate::error::{I18nError, I18nResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

/// Messages for one language, keyed by dot-separated path.
///
/// Values are JSON values: a string is a message, `null` is a tombstone left
/// behind when a key disappears after a reload. The active message set also
/// caches resolved list groups as arrays. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageSet(pub Map<String, Value>);

impl MessageSet {
    pub fn new() -> Self {
        MessageSet(Map::new())
    }

    pub fn with_message(&mut self, key: &str, message: &str) -> &mut Self {
        self.0
            .insert(key.to_owned(), Value::String(message.to_owned()));
        self
    }

    /// The message stored under `key`, if it is a string.
    pub fn get_message(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when `key` exists and is not a tombstone.
    pub fn has_value(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(value) if !value.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow merge. Keys from `other` overwrite keys already present.
    pub fn merge(&mut self, other: MessageSet) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Stores `value` under `key`, returning whether the stored value changed.
    pub(crate) fn set_value(&mut self, key: &str, value: Value) -> bool {
        match self.0.get_mut(key) {
            Some(existing) if *existing == value => false,
            Some(existing) => {
                *existing = value;
                true
            }
            None => {
                self.0.insert(key.to_owned(), value);
                true
            }
        }
    }

    /// Build a message set from a parsed JSON document.
    ///
    /// The root must be an object. Nested objects and arrays are flattened into
    /// dot-separated keys (`auth.failed`, `rules.0`), root keys starting with
    /// `@` are treated as metadata and skipped.
    pub fn from_json_value(json: &Value) -> I18nResult<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| I18nError::Parse("root must be an object".to_string()))?;

        let mut messages = Map::new();
        for (key, value) in obj {
            if key.starts_with('@') {
                continue;
            }
            flatten_into(key, value, &mut messages);
        }
        Ok(MessageSet(messages))
    }

    pub fn from_json_str(content: &str) -> I18nResult<Self> {
        let json: Value = serde_json::from_str(content)?;
        Self::from_json_value(&json)
    }
}

fn flatten_into(path: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(children) => {
            for (key, child) in children {
                flatten_into(&format!("{}.{}", path, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", path, index), item, out);
            }
        }
        Value::String(_) | Value::Null => {
            out.insert(path.to_owned(), value.clone());
        }
        Value::Number(n) => {
            out.insert(path.to_owned(), Value::String(n.to_string()));
        }
        Value::Bool(b) => {
            warn!(key = path, "boolean message value converted to text");
            out.insert(path.to_owned(), Value::String(b.to_string()));
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MessageSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MessageSet(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// A language that has been loaded and committed at least once.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLanguage {
    pub tag: String,
    pub messages: Arc<MessageSet>,
}

impl LoadedLanguage {
    pub fn new(tag: &str, messages: Arc<MessageSet>) -> Self {
        LoadedLanguage {
            tag: tag.to_owned(),
            messages,
        }
    }
}

/// Canonical form used to compare language tags: `en_US` and `en-US` are equal.
pub fn normalize_tag(tag: &str) -> String {
    tag.replace('_', "-")
}
