//! The process-wide instance
//!
//! Most applications use one [`I18n`] for everything. The free functions in
//! this module operate on that shared instance, creating it with default
//! options on first use.

use crate::I18n;
use crate::loader::LoadOutcome;
use crate::options::Options;
use crate::replacer::Replacements;
use crate::watch::Translation;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

static SHARED: Mutex<Option<I18n>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<I18n>> {
    SHARED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The shared instance.
///
/// The first call creates it from `options` and loads its active language.
/// Later calls merge `options` into the existing instance; with
/// `force_apply` the active language is loaded again.
pub fn shared_instance(mut options: Option<Options>, force_apply: bool) -> I18n {
    let (i18n, created) = {
        let mut slot = slot();
        match slot.as_ref() {
            Some(existing) => (existing.clone(), false),
            None => {
                let i18n = I18n::unloaded(options.take().unwrap_or_default());
                *slot = Some(i18n.clone());
                (i18n, true)
            }
        }
    };

    if created {
        i18n.load();
    } else if let Some(options) = options {
        i18n.set_options(options, force_apply);
    } else if force_apply {
        i18n.load();
    }
    i18n
}

/// Reset the shared instance and drop it, so the next access starts fresh.
pub fn reset() {
    let taken = slot().take();
    if let Some(i18n) = taken {
        i18n.reset_state();
    }
}

/// Clear the shared slot if it holds `i18n`.
pub(crate) fn forget(i18n: &I18n) {
    let mut slot = slot();
    if slot.as_ref().is_some_and(|shared| shared.same_instance(i18n)) {
        *slot = None;
    }
}

fn current() -> I18n {
    shared_instance(None, false)
}

pub fn translate(key: &str, replacements: &Replacements) -> String {
    current().translate(key, replacements)
}

pub fn translate_with_count(key: &str, count: f64, replacements: &Replacements) -> String {
    current().translate_with_count(key, count, replacements)
}

pub fn watch_translation(key: &str, replacements: Replacements) -> Translation {
    current().watch_translation(key, replacements)
}

pub fn watch_translation_with_count(
    key: &str,
    count: f64,
    replacements: Replacements,
) -> Translation {
    current().watch_translation_with_count(key, count, replacements)
}

pub fn load_language_async(tag: &str) -> impl Future<Output = LoadOutcome> + Send + use<> {
    current().load_language_async(tag)
}

pub fn is_loaded(tag: Option<&str>) -> bool {
    current().is_loaded(tag)
}

pub fn active_language() -> String {
    current().active_language()
}
