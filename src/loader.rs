//! Language loading
//!
//! Loading a language walks a small state machine. A cached language is
//! committed straight away. Otherwise the provider is asked for the tag (and
//! for the supplemental `php_<tag>` channel when enabled). An empty result
//! retries first with the other separator (`en-US` <-> `en_US`) and then with
//! the fallback language. When every attempt comes back empty the empty set
//! is committed anyway, so the requested language is still recorded.
//!
//! Async loads are cancellable: each call to [`I18n::load_language_async`]
//! supersedes every earlier one. A superseded load settles as
//! [`LoadOutcome::Cancelled`] without touching the active messages.

use crate::I18n;
use crate::messages::{LoadedLanguage, MessageSet, normalize_tag};
use crate::options::{LoadMode, SUPPLEMENTAL_PREFIX};
use crate::source::MessageProvider;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How an async load settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Messages were committed under this tag
    Committed(String),
    /// A newer load (or a reset) superseded this one
    Cancelled,
}

/// Cancellation handle of one async load.
///
/// A token is live while its generation is the newest one issued by the
/// instance; issuing a new token cancels all older ones.
#[derive(Debug)]
pub struct LoadToken {
    generation: u64,
    signal: watch::Receiver<u64>,
}

impl LoadToken {
    pub(crate) fn new(generation: u64, signal: watch::Receiver<u64>) -> Self {
        LoadToken { generation, signal }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow() != self.generation
    }

    /// Resolves once a newer load has been started.
    pub async fn cancelled(&mut self) {
        let generation = self.generation;
        let _ = self.signal.wait_for(|current| *current != generation).await;
    }

    /// Run `fut` unless this token is cancelled first.
    async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

/// What the next attempt of a load has to do.
enum Attempt {
    Cached(LoadedLanguage),
    Fetch {
        provider: Arc<dyn MessageProvider>,
        fallback: String,
        supplemental: bool,
    },
}

/// The attempt that follows an empty result for `tag`, if any.
///
/// Returns the next tag and whether the alternate separator has been tried.
pub(crate) fn next_attempt(
    tag: &str,
    alternate_tried: bool,
    fallback: &str,
) -> Option<(String, bool)> {
    if !alternate_tried && tag.contains(|c: char| c == '-' || c == '_') {
        return Some((swap_separators(tag), true));
    }
    if normalize_tag(tag) != normalize_tag(fallback) {
        return Some((fallback.to_owned(), false));
    }
    None
}

fn swap_separators(tag: &str) -> String {
    tag.chars()
        .map(|c| match c {
            '-' => '_',
            '_' => '-',
            other => other,
        })
        .collect()
}

fn blocking_or_empty(provider: &dyn MessageProvider, tag: &str) -> MessageSet {
    match provider.fetch_blocking(tag) {
        Some(Ok(messages)) => messages,
        Some(Err(e)) => {
            warn!(provider = provider.provider_name(), language = tag, error = %e, "provider failed");
            MessageSet::new()
        }
        None => {
            debug!(
                provider = provider.provider_name(),
                language = tag,
                "provider has no synchronous messages"
            );
            MessageSet::new()
        }
    }
}

async fn fetch_or_empty(provider: &dyn MessageProvider, tag: &str) -> MessageSet {
    provider.fetch(tag).await.unwrap_or_else(|e| {
        warn!(provider = provider.provider_name(), language = tag, error = %e, "provider failed");
        MessageSet::new()
    })
}

fn fetch_merged_blocking(provider: &dyn MessageProvider, tag: &str, supplemental: bool) -> MessageSet {
    let mut messages = blocking_or_empty(provider, tag);
    if supplemental {
        let extra = blocking_or_empty(provider, &format!("{}{}", SUPPLEMENTAL_PREFIX, tag));
        messages.merge(extra);
    }
    messages
}

async fn fetch_merged(provider: &dyn MessageProvider, tag: &str, supplemental: bool) -> MessageSet {
    if !supplemental {
        return fetch_or_empty(provider, tag).await;
    }

    let supplemental_tag = format!("{}{}", SUPPLEMENTAL_PREFIX, tag);
    let (mut messages, extra) = tokio::join!(
        fetch_or_empty(provider, tag),
        fetch_or_empty(provider, &supplemental_tag)
    );
    // Supplemental keys win over primary ones.
    messages.merge(extra);
    messages
}

impl I18n {
    /// Load the active language according to the configured [`LoadMode`].
    ///
    /// In deferred mode the load is spawned on the current tokio runtime; with
    /// no runtime available nothing is loaded.
    pub fn load(&self) {
        let (tag, mode) = {
            let state = self.state();
            (
                state.options.active_language(),
                state.options.load_mode(),
            )
        };

        match mode {
            LoadMode::Blocking => {
                self.load_language(&tag);
            }
            LoadMode::Deferred => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(self.load_language_async(&tag));
                }
                Err(_) => debug!(language = %tag, "no tokio runtime, deferred load skipped"),
            },
        }
    }

    /// Load `tag` through the provider's blocking path and make it active.
    ///
    /// Returns the tag the messages were committed under, which is the
    /// fallback language when `tag` had no messages.
    pub fn load_language(&self, tag: &str) -> String {
        let mut tag = tag.to_owned();
        let mut alternate_tried = false;

        loop {
            let (provider, fallback, supplemental) = match self.plan_attempt(&tag) {
                Attempt::Cached(language) => {
                    self.commit_language(&language.tag, language.messages, None);
                    return language.tag;
                }
                Attempt::Fetch {
                    provider,
                    fallback,
                    supplemental,
                } => (provider, fallback, supplemental),
            };

            let messages = fetch_merged_blocking(provider.as_ref(), &tag, supplemental);
            if messages.is_empty() {
                if let Some((next, alternate)) = next_attempt(&tag, alternate_tried, &fallback) {
                    debug!(from = %tag, to = %next, "no messages, retrying");
                    tag = next;
                    alternate_tried = alternate;
                    continue;
                }
            }

            self.commit_language(&tag, Arc::new(messages), None);
            return tag;
        }
    }

    /// Load `tag` asynchronously and make it active.
    ///
    /// Calling this cancels any async load still in flight on this instance.
    /// Cancellation happens at call time, before the returned future is
    /// first polled.
    pub fn load_language_async(
        &self,
        tag: &str,
    ) -> impl Future<Output = LoadOutcome> + Send + use<> {
        let token = self.begin_load();
        let this = self.clone();
        let tag = tag.to_owned();
        async move { this.run_async_load(tag, token).await }
    }

    async fn run_async_load(self, tag: String, mut token: LoadToken) -> LoadOutcome {
        let mut tag = tag;
        let mut alternate_tried = false;

        loop {
            let (provider, fallback, supplemental) = match self.plan_attempt(&tag) {
                Attempt::Cached(language) => {
                    return if self.commit_language(&language.tag, language.messages, Some(&token)) {
                        LoadOutcome::Committed(language.tag)
                    } else {
                        LoadOutcome::Cancelled
                    };
                }
                Attempt::Fetch {
                    provider,
                    fallback,
                    supplemental,
                } => (provider, fallback, supplemental),
            };

            let fetched = token
                .guard(fetch_merged(provider.as_ref(), &tag, supplemental))
                .await;
            let Some(messages) = fetched else {
                debug!(language = %tag, "load cancelled");
                return LoadOutcome::Cancelled;
            };

            if messages.is_empty() {
                if let Some((next, alternate)) = next_attempt(&tag, alternate_tried, &fallback) {
                    debug!(from = %tag, to = %next, "no messages, retrying");
                    tag = next;
                    alternate_tried = alternate;
                    continue;
                }
            }

            return if self.commit_language(&tag, Arc::new(messages), Some(&token)) {
                LoadOutcome::Committed(tag)
            } else {
                LoadOutcome::Cancelled
            };
        }
    }

    /// Issue a new load token, cancelling every older one.
    pub(crate) fn begin_load(&self) -> LoadToken {
        let mut state = self.state();
        state.generation += 1;
        self.inner.cancel.send_replace(state.generation);
        LoadToken::new(state.generation, self.inner.cancel.subscribe())
    }

    fn plan_attempt(&self, tag: &str) -> Attempt {
        let state = self.state();
        if let Some(language) = state.store.find_loaded(tag) {
            debug!(language = %language.tag, "language already loaded");
            return Attempt::Cached(language.clone());
        }
        Attempt::Fetch {
            provider: state.options.provider(),
            fallback: state.options.fallback_language().to_owned(),
            supplemental: state.options.supplemental_source(),
        }
    }

    /// Commit `messages` as the active language.
    ///
    /// With a token, nothing happens unless the token is still the newest one;
    /// the check and the commit share one lock.
    pub(crate) fn commit_language(
        &self,
        tag: &str,
        messages: Arc<MessageSet>,
        token: Option<&LoadToken>,
    ) -> bool {
        let (changes, subscribers, on_loaded, document) = {
            let mut state = self.state();
            if token.is_some_and(|token| token.generation != state.generation) {
                debug!(language = tag, "stale load discarded");
                return false;
            }
            let changes = state.store.commit(tag, messages);
            state.options.active_language = Some(tag.to_owned());
            (
                changes,
                state.subscriber_list(),
                state.options.on_language_loaded.clone(),
                state.options.document.clone(),
            )
        };

        info!(language = tag, changed = changes.len(), "language committed");
        self.publish(&changes, &subscribers);

        if let Some(callback) = on_loaded {
            callback(tag);
        }
        if let Some(document) = document {
            document.set_language(&tag.replace('_', "-"));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::I18nResult;
    use crate::options::Options;
    use crate::replacer::Replacements;
    use crate::source::{MockMode, MockProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves different text on each path and counts which one was used.
    #[derive(Default)]
    struct PathCounter {
        blocking: AtomicUsize,
        fetched: AtomicUsize,
    }

    #[async_trait]
    impl MessageProvider for PathCounter {
        async fn fetch(&self, _tag: &str) -> I18nResult<MessageSet> {
            self.fetched.fetch_add(1, Ordering::SeqCst);
            Ok([("hello", "async")].into_iter().collect())
        }

        fn fetch_blocking(&self, _tag: &str) -> Option<I18nResult<MessageSet>> {
            self.blocking.fetch_add(1, Ordering::SeqCst);
            Some(Ok([("hello", "sync")].into_iter().collect()))
        }

        fn provider_name(&self) -> &str {
            "Path Counter"
        }
    }

    #[test]
    fn test_next_attempt_chain() {
        assert_eq!(
            next_attempt("en-US", false, "en"),
            Some(("en_US".to_string(), true))
        );
        assert_eq!(
            next_attempt("en_US", true, "en"),
            Some(("en".to_string(), false))
        );
        assert_eq!(next_attempt("en", false, "en"), None);
    }

    #[test]
    fn test_next_attempt_terminates_when_fallback_has_separator() {
        assert_eq!(
            next_attempt("fr", false, "pt_BR"),
            Some(("pt_BR".to_string(), false))
        );
        assert_eq!(
            next_attempt("pt_BR", false, "pt_BR"),
            Some(("pt-BR".to_string(), true))
        );
        assert_eq!(next_attempt("pt-BR", true, "pt_BR"), None);
    }

    #[test]
    fn test_swap_separators() {
        assert_eq!(swap_separators("zh-Hant_TW"), "zh_Hant-TW");
    }

    #[tokio::test]
    async fn test_token_cancellation() {
        let i18n = I18n::unloaded(Options::new());
        let mut first = i18n.begin_load();
        assert!(!first.is_cancelled());

        let second = i18n.begin_load();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.generation() > first.generation());

        first.cancelled().await;
    }

    #[tokio::test]
    async fn test_guard_returns_none_when_cancelled() {
        let i18n = I18n::unloaded(Options::new());
        let mut token = i18n.begin_load();
        let _newer = i18n.begin_load();

        let result = token.guard(async { 42 }).await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_supplemental_source_wins_on_conflict() {
        let provider = MockProvider::new(MockMode::Async)
            .with_messages("en", &[("a", "json"), ("b", "json")])
            .with_messages("php_en", &[("b", "php"), ("c", "php")]);

        let merged = fetch_merged(&provider, "en", true).await;
        assert_eq!(merged.get_message("a"), Some("json"));
        assert_eq!(merged.get_message("b"), Some("php"));
        assert_eq!(merged.get_message("c"), Some("php"));

        let merged = fetch_merged_blocking(&provider, "en", true);
        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_empty() {
        let provider = MockProvider::new(MockMode::Blocking).with_failure("en", "boom");
        assert!(fetch_merged(&provider, "en", false).await.is_empty());
        assert!(fetch_merged_blocking(&provider, "en", false).is_empty());
    }

    #[tokio::test]
    async fn test_async_load_awaits_fetch_and_blocking_load_does_not() {
        let provider = Arc::new(PathCounter::default());
        let i18n = I18n::unloaded(Options::new().with_provider(provider.clone()));

        let outcome = i18n.load_language_async("en").await;
        assert_eq!(outcome, LoadOutcome::Committed("en".to_string()));
        assert_eq!(provider.fetched.load(Ordering::SeqCst), 1);
        assert_eq!(provider.blocking.load(Ordering::SeqCst), 0);
        assert_eq!(i18n.translate("hello", &Replacements::new()), "async");

        assert_eq!(i18n.load_language("fr"), "fr");
        assert_eq!(provider.fetched.load(Ordering::SeqCst), 1);
        assert_eq!(provider.blocking.load(Ordering::SeqCst), 1);
        assert_eq!(i18n.translate("hello", &Replacements::new()), "sync");
    }
}
