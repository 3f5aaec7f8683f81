//! Key-based UI translations.
//!
//! An [`I18n`] instance holds the messages of one active language, loads
//! further languages through a [`MessageProvider`], and renders messages with
//! `:name` placeholders and inline plural forms.
//!
//! ```
//! use kiwi_i18n::{I18n, MessageSet, Options, Replacements};
//! use kiwi_i18n::source::StaticProvider;
//! use std::sync::Arc;
//!
//! let mut en = MessageSet::new();
//! en.with_message("welcome", "Welcome, :name")
//!     .with_message("apples", "{0} no apples|{1} one apple|[2,*] :count apples");
//!
//! let i18n = I18n::new(
//!     Options::new().with_provider(Arc::new(StaticProvider::new().with_language("en", en))),
//! );
//!
//! let mut replacements = Replacements::new();
//! replacements.with("name", "ada");
//! assert_eq!(i18n.translate("welcome", &replacements), "Welcome, ada");
//! assert_eq!(i18n.translate_with_count("apples", 3.0, &Replacements::new()), "3 apples");
//! ```

pub mod error;
pub mod loader;
pub mod messages;
pub mod options;
pub mod pluralization;
pub mod replacer;
pub mod resolver;
pub mod shared;
pub mod source;
pub mod store;
pub mod watch;


pub use error::{I18nError, I18nResult};
pub use loader::{LoadOutcome, LoadToken};
pub use messages::{LoadedLanguage, MessageSet, normalize_tag};
pub use options::{
    DEFAULT_FALLBACK_LANGUAGE, LanguageAttribute, LoadMode, LoadedCallback, Options,
    SUPPLEMENTAL_PREFIX,
};
pub use pluralization::{PluralFamily, choose, plural_index};
pub use replacer::{Replacements, apply_replacements};
pub use resolver::Resolved;
pub use source::MessageProvider;
pub use store::{LanguageStore, MessageChange};
pub use watch::Translation;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch as channel;

/// Called for every key whose active value changes.
pub type Subscriber = Arc<dyn Fn(&MessageChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct State {
    options: Options,
    store: LanguageStore,
    /// Generation of the newest async load; older loads are stale.
    generation: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl State {
    fn subscriber_list(&self) -> Vec<Subscriber> {
        self.subscribers
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect()
    }
}

struct Inner {
    state: Mutex<State>,
    /// Bumped after every change of the active messages.
    revision: channel::Sender<u64>,
    /// Carries the newest load generation to in-flight loads.
    cancel: channel::Sender<u64>,
}

/// A translation instance.
///
/// Cloning is cheap and yields a handle to the same instance.
#[derive(Clone)]
pub struct I18n {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("I18n")
            .field("active_language", &state.options.active_language())
            .field("loaded", &state.store.loaded().len())
            .field("generation", &state.generation)
            .finish()
    }
}

impl I18n {
    /// Create an instance and load its active language.
    pub fn new(options: Options) -> Self {
        let i18n = Self::unloaded(options);
        i18n.load();
        i18n
    }

    /// Create an instance without loading anything.
    ///
    /// Use this when the first load should be awaited by the caller, e.g.
    /// with [`I18n::load_language_async`].
    pub fn unloaded(options: Options) -> Self {
        let (revision, _) = channel::channel(0);
        let (cancel, _) = channel::channel(0);
        I18n {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    options,
                    store: LanguageStore::new(),
                    generation: 0,
                    subscribers: Vec::new(),
                    next_subscription: 0,
                }),
                revision,
                cancel,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge `options` into the current ones; with `force_load` the active
    /// language is loaded again afterwards.
    pub fn set_options(&self, options: Options, force_load: bool) {
        self.state().options.merge(options);
        if force_load {
            self.load();
        }
    }

    pub fn options(&self) -> Options {
        self.state().options.clone()
    }

    pub fn active_language(&self) -> String {
        self.state().options.active_language()
    }

    /// Whether `tag` (or the active language when `None`) has been loaded.
    pub fn is_loaded(&self, tag: Option<&str>) -> bool {
        let state = self.state();
        match tag {
            Some(tag) => state.store.is_loaded(tag),
            None => state.store.is_loaded(&state.options.active_language()),
        }
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        self.state()
            .store
            .loaded()
            .iter()
            .map(|language| language.tag.clone())
            .collect()
    }

    /// Snapshot of the active message set, tombstones included.
    pub fn active_messages(&self) -> MessageSet {
        self.state().store.active().clone()
    }

    pub fn resolve(&self, key: &str) -> Resolved {
        let mut guard = self.state();
        let state = &mut *guard;
        resolver::resolve(
            key,
            state.store.active_mut(),
            state.options.default_key_prefix(),
        )
    }

    /// Translate `key` and fill in its placeholders.
    ///
    /// A key that resolves to a list renders its items joined with `", "`.
    pub fn translate(&self, key: &str, replacements: &Replacements) -> String {
        let message = match self.resolve(key) {
            Resolved::Text(text) => text,
            Resolved::List(items) => items.join(", "),
        };
        apply_replacements(&message, replacements)
    }

    /// Translate every item of a list key; a plain key yields one item.
    pub fn translate_list(&self, key: &str, replacements: &Replacements) -> Vec<String> {
        match self.resolve(key) {
            Resolved::Text(text) => vec![apply_replacements(&text, replacements)],
            Resolved::List(items) => items
                .iter()
                .map(|item| apply_replacements(item, replacements))
                .collect(),
        }
    }

    /// Translate `key`, pick the plural form for `count` and fill in the
    /// placeholders. `:count` is always available as a placeholder.
    pub fn translate_with_count(&self, key: &str, count: f64, replacements: &Replacements) -> String {
        let message = match self.resolve(key) {
            Resolved::Text(text) => text,
            Resolved::List(items) => items.join(", "),
        };
        let form = choose(&message, count, &self.active_language());

        let mut replacements = replacements.clone();
        replacements.with("count", count);
        apply_replacements(&form, &replacements)
    }

    /// A live translation that can wait for the active messages to change.
    pub fn watch_translation(&self, key: &str, replacements: Replacements) -> Translation {
        Translation::new(self.clone(), key, replacements, None)
    }

    pub fn watch_translation_with_count(
        &self,
        key: &str,
        count: f64,
        replacements: Replacements,
    ) -> Translation {
        Translation::new(self.clone(), key, replacements, Some(count))
    }

    /// Call `subscriber` for every future change of an active key.
    ///
    /// Changes are published after the instance lock is released, so a
    /// subscriber may call back into the instance. Commits racing on
    /// different threads can reach subscribers in either order; read
    /// [`I18n::active_messages`] when the final state matters.
    ///
    /// Lookups cache list groups and untranslated-key fallbacks in the active
    /// set without publishing them. A later commit therefore reports the
    /// removal of such a key although its addition was never reported.
    pub fn subscribe(&self, subscriber: impl Fn(&MessageChange) + Send + Sync + 'static) -> SubscriptionId {
        let mut state = self.state();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.subscribers.push((id, Arc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        state.subscribers.len() != before
    }

    /// Cancel loads in flight, forget every loaded language, tombstone every
    /// active key and restore default options. Subscribers stay registered.
    ///
    /// When this instance is the shared one, the shared slot is cleared too.
    pub fn reset(&self) {
        self.reset_state();
        shared::forget(self);
    }

    pub(crate) fn reset_state(&self) {
        let (changes, subscribers) = {
            let mut state = self.state();
            state.generation += 1;
            self.inner.cancel.send_replace(state.generation);
            state.options = Options::default();
            (state.store.reset(), state.subscriber_list())
        };
        tracing::debug!(tombstoned = changes.len(), "instance reset");
        self.publish(&changes, &subscribers);
    }

    pub fn same_instance(&self, other: &I18n) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn revision(&self) -> channel::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn publish(&self, changes: &[MessageChange], subscribers: &[Subscriber]) {
        for change in changes {
            for subscriber in subscribers {
                subscriber(change);
            }
        }
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn provider() -> Arc<StaticProvider> {
        let en: MessageSet = [
            ("greeting", "Hello, :name!"),
            ("apples", "{0} none|{1} one apple|[2,*] :count apples"),
            ("rules.0", "required"),
            ("rules.1", "email"),
        ]
        .into_iter()
        .collect();
        let fr: MessageSet = [("greeting", "Bonjour, :Name !")].into_iter().collect();
        Arc::new(
            StaticProvider::new()
                .with_language("en", en)
                .with_language("fr", fr),
        )
    }

    #[test]
    fn test_translate() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        let mut replacements = Replacements::new();
        replacements.with("name", "world");

        assert_eq!(i18n.translate("greeting", &replacements), "Hello, world!");
        assert_eq!(i18n.translate("missing.key", &replacements), "missing.key");
        assert_eq!(i18n.translate("rules", &replacements), "required, email");
        assert_eq!(
            i18n.translate_list("rules", &replacements),
            vec!["required", "email"]
        );
    }

    #[test]
    fn test_translate_with_count() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        let none = Replacements::new();
        assert_eq!(i18n.translate_with_count("apples", 0.0, &none), "none");
        assert_eq!(i18n.translate_with_count("apples", 1.0, &none), "one apple");
        assert_eq!(i18n.translate_with_count("apples", 5.0, &none), "5 apples");
    }

    #[test]
    fn test_default_key_prefix_is_stripped() {
        let i18n = I18n::new(
            Options::new()
                .with_provider(provider())
                .with_default_key_prefix("app."),
        );
        assert_eq!(i18n.translate("app.Save", &Replacements::new()), "Save");
    }

    #[test]
    fn test_switch_language() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        assert_eq!(i18n.active_language(), "en");

        assert_eq!(i18n.load_language("fr"), "fr");
        let mut replacements = Replacements::new();
        replacements.with("name", "monde");
        assert_eq!(i18n.translate("greeting", &replacements), "Bonjour, Monde !");
        assert!(i18n.is_loaded(Some("en")));
        assert!(i18n.is_loaded(None));
        assert_eq!(i18n.loaded_languages(), vec!["en", "fr"]);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let id = i18n.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        i18n.load_language("fr");
        // greeting changed, apples and both rules entries tombstoned
        assert_eq!(seen.load(Ordering::SeqCst), 4);

        assert!(i18n.unsubscribe(id));
        assert!(!i18n.unsubscribe(id));
        i18n.load_language("en");
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_set_options_force_load() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        i18n.set_options(Options::new().with_active_language("fr"), false);
        assert_eq!(i18n.active_language(), "fr");
        assert!(!i18n.is_loaded(None));

        i18n.set_options(Options::new(), true);
        assert!(i18n.is_loaded(Some("fr")));
    }

    #[test]
    fn test_clones_share_state() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        let other = i18n.clone();
        other.load_language("fr");
        assert_eq!(i18n.active_language(), "fr");
        assert!(i18n.same_instance(&other));
        assert!(!i18n.same_instance(&I18n::new(Options::new())));
    }

    #[test]
    fn test_lookup_cache_is_published_only_on_removal() {
        let i18n = I18n::new(Options::new().with_provider(provider()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        i18n.subscribe(move |change| recorder.lock().unwrap().push(change.clone()));

        assert_eq!(i18n.translate("unknown", &Replacements::new()), "unknown");
        assert_eq!(i18n.translate("rules", &Replacements::new()), "required, email");
        assert!(seen.lock().unwrap().is_empty());
        assert!(i18n.active_messages().has_value("unknown"));

        i18n.load_language("fr");
        let seen = seen.lock().unwrap();
        let removed: Vec<&str> = seen
            .iter()
            .filter(|change| change.is_removal())
            .map(|change| change.key.as_str())
            .collect();
        assert!(removed.contains(&"unknown"));
        assert!(removed.contains(&"rules"));
    }
}
