//! Message sources
//!
//! A [`MessageProvider`] turns a language tag into the messages of that
//! language. Providers that already hold their data in memory (or can read it
//! without blocking an event loop for long) expose it through
//! [`MessageProvider::fetch_blocking`]. Everything else is reached through the
//! async [`MessageProvider::fetch`].
//!
//! An unknown tag must yield an empty [`MessageSet`], not an error. Errors are
//! reserved for real failures; the loader logs them and treats the language as
//! empty, which moves it along the fallback chain.

pub mod files;
pub mod http;
pub mod mock;

use crate::error::I18nResult;
use crate::messages::MessageSet;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

pub use files::{JsonDirProvider, has_supplemental_files, load_messages_from_file};
pub use http::HttpProvider;
pub use mock::{MockMode, MockProvider};

#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Fetch the messages for `tag`.
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet>;

    /// Messages for `tag` if they are available without awaiting.
    ///
    /// `None` means this provider only works asynchronously.
    fn fetch_blocking(&self, _tag: &str) -> Option<I18nResult<MessageSet>> {
        None
    }

    /// Used in log output.
    fn provider_name(&self) -> &str;
}

/// Provider with no messages at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyProvider;

#[async_trait]
impl MessageProvider for EmptyProvider {
    async fn fetch(&self, _tag: &str) -> I18nResult<MessageSet> {
        Ok(MessageSet::new())
    }

    fn fetch_blocking(&self, _tag: &str) -> Option<I18nResult<MessageSet>> {
        Some(Ok(MessageSet::new()))
    }

    fn provider_name(&self) -> &str {
        "Empty Provider"
    }
}

/// In-memory messages keyed by language tag.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    languages: HashMap<String, MessageSet>,
}

impl StaticProvider {
    pub fn new() -> Self {
        StaticProvider::default()
    }

    /// Read every `<tag>.json` file of `dir` up front.
    ///
    /// # Errors
    /// Fails if `dir` is not a directory or any file in it is not a valid
    /// message file.
    pub fn from_dir(dir: &Path) -> I18nResult<Self> {
        Ok(StaticProvider {
            languages: files::load_all_messages_from_dir(dir)?,
        })
    }

    pub fn with_language(mut self, tag: &str, messages: MessageSet) -> Self {
        self.languages.insert(tag.to_owned(), messages);
        self
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    fn lookup(&self, tag: &str) -> MessageSet {
        self.languages.get(tag).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl MessageProvider for StaticProvider {
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet> {
        Ok(self.lookup(tag))
    }

    fn fetch_blocking(&self, tag: &str) -> Option<I18nResult<MessageSet>> {
        Some(Ok(self.lookup(tag)))
    }

    fn provider_name(&self) -> &str {
        "Static Provider"
    }
}

/// Provider backed by a synchronous closure.
pub struct FnProvider<F>
where
    F: Fn(&str) -> I18nResult<MessageSet> + Send + Sync,
{
    resolve: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&str) -> I18nResult<MessageSet> + Send + Sync,
{
    pub fn new(resolve: F) -> Self {
        FnProvider { resolve }
    }
}

#[async_trait]
impl<F> MessageProvider for FnProvider<F>
where
    F: Fn(&str) -> I18nResult<MessageSet> + Send + Sync,
{
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet> {
        (self.resolve)(tag)
    }

    fn fetch_blocking(&self, tag: &str) -> Option<I18nResult<MessageSet>> {
        Some((self.resolve)(tag))
    }

    fn provider_name(&self) -> &str {
        "Function Provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::I18nError;

    #[tokio::test]
    async fn test_static_provider_unknown_tag_is_empty() {
        let mut en = MessageSet::new();
        en.with_message("hello", "Hello");
        let provider = StaticProvider::new().with_language("en", en);

        assert_eq!(
            provider.fetch("en").await.unwrap().get_message("hello"),
            Some("Hello")
        );
        assert!(provider.fetch("xx").await.unwrap().is_empty());
        assert!(provider.fetch_blocking("xx").unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_fn_provider_is_blocking_capable() {
        let provider = FnProvider::new(|tag: &str| {
            if tag == "broken" {
                return Err(I18nError::ProviderFailure("no such file".to_string()));
            }
            Ok([("lang", tag)].into_iter().collect())
        });

        let messages = provider.fetch_blocking("de").unwrap().unwrap();
        assert_eq!(messages.get_message("lang"), Some("de"));
        assert!(provider.fetch_blocking("broken").unwrap().is_err());
    }

    #[tokio::test]
    async fn test_empty_provider() {
        assert!(EmptyProvider.fetch("en").await.unwrap().is_empty());
        assert_eq!(EmptyProvider.provider_name(), "Empty Provider");
    }

    #[test]
    fn test_static_provider_from_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"hello": "Hello"}"#).unwrap();
        std::fs::write(dir.path().join("pt_BR.json"), r#"{"hello": "Olá"}"#).unwrap();

        let provider = StaticProvider::from_dir(dir.path()).unwrap();
        let mut tags: Vec<&str> = provider.tags().collect();
        tags.sort();
        assert_eq!(tags, vec!["en", "pt_BR"]);

        std::fs::remove_file(dir.path().join("pt_BR.json")).unwrap();
        let pt = provider.fetch_blocking("pt_BR").unwrap().unwrap();
        assert_eq!(pt.get_message("hello"), Some("Olá"));

        assert!(StaticProvider::from_dir(&dir.path().join("missing")).is_err());
    }
}
