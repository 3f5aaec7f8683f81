use std::fmt::Display;

/// Named placeholder values, applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replacements(pub Vec<(String, String)>);

impl Replacements {
    pub fn new() -> Self {
        Replacements(Vec::new())
    }

    /// Set `name` to `value`. An existing entry keeps its position.
    pub fn with(&mut self, name: &str, value: impl Display) -> &mut Self {
        let value = value.to_string();
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_owned(), value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Replacements
where
    K: AsRef<str>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut replacements = Replacements::new();
        for (name, value) in iter {
            replacements.with(name.as_ref(), value);
        }
        replacements
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Replacements
where
    K: AsRef<str>,
    V: Display,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Substitute `:name`, `:NAME` and `:Name` placeholders.
///
/// Each form receives the value in the matching case: as given, upper-cased,
/// or with its first character capitalized. Pairs are applied in order, so a
/// value inserted by an earlier pair can itself be rewritten by a later one.
pub fn apply_replacements(message: &str, replacements: &Replacements) -> String {
    let mut message = message.to_string();
    for (name, value) in replacements.iter() {
        if name.is_empty() {
            continue;
        }
        message = message
            .replace(&format!(":{}", name), value)
            .replace(&format!(":{}", name.to_uppercase()), &value.to_uppercase())
            .replace(&format!(":{}", capitalize(name)), &capitalize(value));
    }
    message
}
