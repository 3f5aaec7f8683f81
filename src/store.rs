use crate::messages::{LoadedLanguage, MessageSet, normalize_tag};
use serde_json::Value;
use std::sync::Arc;

/// A single observable change in the active message set.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageChange {
    pub key: String,
    /// The new value; `Value::Null` when the key was tombstoned.
    pub value: Value,
}

impl MessageChange {
    pub fn is_removal(&self) -> bool {
        self.value.is_null()
    }
}

/// Loaded languages plus the active message set that bound UI observes.
///
/// Keys are never removed from the active set. A key that disappears on a
/// language switch or a reset is overwritten with `null`, so an observer bound
/// to it sees a value change instead of a vanished entry.
#[derive(Debug, Default)]
pub struct LanguageStore {
    loaded: Vec<LoadedLanguage>,
    active: MessageSet,
}

impl LanguageStore {
    pub fn new() -> Self {
        LanguageStore::default()
    }

    /// Make `messages` the active set and remember them under `tag`.
    ///
    /// Returns the keys whose value changed.
    pub fn commit(&mut self, tag: &str, messages: Arc<MessageSet>) -> Vec<MessageChange> {
        let mut changes = Vec::new();

        for (key, value) in messages.iter() {
            if self.active.set_value(key, value.clone()) {
                changes.push(MessageChange {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        let stale: Vec<String> = self
            .active
            .keys()
            .filter(|key| !messages.contains_key(key))
            .cloned()
            .collect();
        for key in stale {
            if self.active.set_value(&key, Value::Null) {
                changes.push(MessageChange {
                    key,
                    value: Value::Null,
                });
            }
        }

        if !self.loaded.iter().any(|language| language.tag == tag) {
            self.loaded.push(LoadedLanguage::new(tag, messages));
        }

        changes
    }

    /// Whether a language matching `tag` was loaded; `-` and `_` are interchangeable.
    pub fn is_loaded(&self, tag: &str) -> bool {
        self.find_loaded(tag).is_some()
    }

    /// The loaded entry for `tag`, preferring an exact tag match.
    pub fn find_loaded(&self, tag: &str) -> Option<&LoadedLanguage> {
        self.loaded
            .iter()
            .find(|language| language.tag == tag)
            .or_else(|| {
                let wanted = normalize_tag(tag);
                self.loaded
                    .iter()
                    .find(|language| normalize_tag(&language.tag) == wanted)
            })
    }

    pub fn loaded(&self) -> &[LoadedLanguage] {
        &self.loaded
    }

    pub fn active(&self) -> &MessageSet {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut MessageSet {
        &mut self.active
    }

    /// Forget every loaded language and tombstone every active key.
    pub fn reset(&mut self) -> Vec<MessageChange> {
        self.loaded.clear();

        let keys: Vec<String> = self.active.keys().cloned().collect();
        keys.into_iter()
            .filter_map(|key| {
                self.active
                    .set_value(&key, Value::Null)
                    .then_some(MessageChange {
                        key,
                        value: Value::Null,
                    })
            })
            .collect()
    }
}
