//! Mock message provider for testing
//!
//! Serves in-memory languages with optional simulated latency and failures,
//! and records every tag it is asked for so tests can assert on cache hits.
//!
//! # Example
//!
//! ```ignore
//! use kiwi_i18n::source::{MessageProvider, MockMode, MockProvider};
//!
//! #[tokio::test]
//! async fn test_fetch() {
//!     let mock = MockProvider::new(MockMode::Async).with_messages("en", &[("hi", "Hi")]);
//!     let messages = mock.fetch("en").await.unwrap();
//!     assert_eq!(messages.get_message("hi"), Some("Hi"));
//!     assert_eq!(mock.calls(), vec!["en"]);
//! }
//! ```

use crate::error::{I18nError, I18nResult};
use crate::messages::MessageSet;
use crate::source::MessageProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Which fetch path the mock serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Data only through `fetch`; `fetch_blocking` returns `None`
    Async,
    /// Data through both `fetch` and `fetch_blocking`
    Blocking,
}

#[derive(Debug)]
pub struct MockProvider {
    mode: MockMode,
    languages: HashMap<String, MessageSet>,
    failures: HashMap<String, String>,
    /// Simulated latency per tag, in milliseconds
    delays: HashMap<String, u64>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            languages: HashMap::new(),
            failures: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_language(mut self, tag: &str, messages: MessageSet) -> Self {
        self.languages.insert(tag.to_owned(), messages);
        self
    }

    pub fn with_messages(self, tag: &str, pairs: &[(&str, &str)]) -> Self {
        self.with_language(tag, pairs.iter().copied().collect())
    }

    /// Make every fetch of `tag` fail with `message`
    pub fn with_failure(mut self, tag: &str, message: &str) -> Self {
        self.failures.insert(tag.to_owned(), message.to_owned());
        self
    }

    /// Delay async fetches of `tag` by `delay_ms`
    pub fn with_delay(mut self, tag: &str, delay_ms: u64) -> Self {
        self.delays.insert(tag.to_owned(), delay_ms);
        self
    }

    /// Every tag requested so far, in request order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, tag: &str) -> usize {
        self.calls().iter().filter(|call| *call == tag).count()
    }

    fn respond(&self, tag: &str) -> I18nResult<MessageSet> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tag.to_owned());

        if let Some(message) = self.failures.get(tag) {
            return Err(I18nError::ProviderFailure(message.clone()));
        }
        Ok(self.languages.get(tag).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl MessageProvider for MockProvider {
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet> {
        if let Some(delay_ms) = self.delays.get(tag) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        self.respond(tag)
    }

    fn fetch_blocking(&self, tag: &str) -> Option<I18nResult<MessageSet>> {
        match self.mode {
            MockMode::Async => None,
            MockMode::Blocking => Some(self.respond(tag)),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_languages_and_records_calls() {
        let mock = MockProvider::new(MockMode::Async).with_messages("en", &[("hi", "Hi")]);

        let en = mock.fetch("en").await.unwrap();
        assert_eq!(en.get_message("hi"), Some("Hi"));
        assert!(mock.fetch("fr").await.unwrap().is_empty());
        assert_eq!(mock.calls(), vec!["en", "fr"]);
        assert_eq!(mock.call_count("en"), 1);
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let mock = MockProvider::new(MockMode::Async).with_failure("de", "timeout");
        match mock.fetch("de").await {
            Err(I18nError::ProviderFailure(msg)) => assert_eq!(msg, "timeout"),
            other => panic!("Expected ProviderFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_blocking_path_depends_on_mode() {
        let async_only = MockProvider::new(MockMode::Async).with_messages("en", &[("a", "b")]);
        assert!(async_only.fetch_blocking("en").is_none());
        assert!(async_only.calls().is_empty());

        let blocking = MockProvider::new(MockMode::Blocking).with_messages("en", &[("a", "b")]);
        let en = blocking.fetch_blocking("en").unwrap().unwrap();
        assert_eq!(en.get_message("a"), Some("b"));
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockProvider::new(MockMode::Async).with_delay("en", 30);
        let start = std::time::Instant::now();
        mock.fetch("en").await.unwrap();
        assert!(start.elapsed().as_millis() >= 30);
    }
}
