use crate::I18n;
use crate::replacer::Replacements;
use tokio::sync::watch;

/// A translation that follows the active language.
///
/// The key is resolved once on creation so that it is present in the active
/// message set. [`Translation::changed`] resolves whenever the active messages
/// change, after which [`Translation::value`] renders the new text.
#[derive(Debug)]
pub struct Translation {
    i18n: I18n,
    key: String,
    replacements: Replacements,
    count: Option<f64>,
    revision: watch::Receiver<u64>,
}

impl Translation {
    pub(crate) fn new(
        i18n: I18n,
        key: &str,
        replacements: Replacements,
        count: Option<f64>,
    ) -> Self {
        let mut revision = i18n.revision();
        revision.mark_unchanged();
        i18n.resolve(key);
        Translation {
            i18n,
            key: key.to_owned(),
            replacements,
            count,
            revision,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn count(&self) -> Option<f64> {
        self.count
    }

    /// Render the translation against the current active messages.
    pub fn value(&self) -> String {
        match self.count {
            Some(count) => self
                .i18n
                .translate_with_count(&self.key, count, &self.replacements),
            None => self.i18n.translate(&self.key, &self.replacements),
        }
    }

    /// Wait until the active messages change.
    ///
    /// Returns `false` if the change channel has closed.
    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    /// Whether a change happened that [`Translation::changed`] has not yet
    /// reported.
    pub fn has_changed(&self) -> bool {
        self.revision.has_changed().unwrap_or(false)
    }
}
