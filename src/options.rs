use crate::source::{EmptyProvider, MessageProvider};
use std::sync::Arc;

pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";

/// Prefix of the secondary message channel merged over the primary one.
pub const SUPPLEMENTAL_PREFIX: &str = "php_";

/// How `I18n::load` fetches the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Load synchronously from the provider's blocking path
    #[default]
    Blocking,
    /// Spawn an async load on the current tokio runtime
    Deferred,
}

/// The document-level language attribute of a UI root.
pub trait LanguageAttribute: Send + Sync {
    fn set_language(&self, tag: &str);

    /// The language the document currently declares, if any.
    fn language(&self) -> Option<String> {
        None
    }
}

pub type LoadedCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Instance configuration.
///
/// Every field is optional; unset fields fall back to their defaults when
/// read. [`Options::merge`] applies another set of options field by field.
#[derive(Clone, Default)]
pub struct Options {
    pub active_language: Option<String>,
    pub fallback_language: Option<String>,
    pub provider: Option<Arc<dyn MessageProvider>>,
    pub on_language_loaded: Option<LoadedCallback>,
    pub default_key_prefix: Option<String>,
    pub supplemental_source: Option<bool>,
    pub document: Option<Arc<dyn LanguageAttribute>>,
    pub load_mode: Option<LoadMode>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn with_active_language(mut self, tag: &str) -> Self {
        self.active_language = Some(tag.to_owned());
        self
    }

    pub fn with_fallback_language(mut self, tag: &str) -> Self {
        self.fallback_language = Some(tag.to_owned());
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn MessageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_on_language_loaded(
        mut self,
        callback: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_language_loaded = Some(Arc::new(callback));
        self
    }

    pub fn with_default_key_prefix(mut self, prefix: &str) -> Self {
        self.default_key_prefix = Some(prefix.to_owned());
        self
    }

    pub fn with_supplemental_source(mut self, enabled: bool) -> Self {
        self.supplemental_source = Some(enabled);
        self
    }

    pub fn with_document(mut self, document: Arc<dyn LanguageAttribute>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = Some(mode);
        self
    }

    pub fn fallback_language(&self) -> &str {
        self.fallback_language
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_LANGUAGE)
    }

    /// The active language.
    ///
    /// Unset, it is the document's declared language (`pt-BR` read as
    /// `pt_BR`), and without one the fallback language.
    pub fn active_language(&self) -> String {
        if let Some(tag) = &self.active_language {
            return tag.clone();
        }
        self.document
            .as_ref()
            .and_then(|document| document.language())
            .filter(|tag| !tag.is_empty())
            .map(|tag| tag.replace('-', "_"))
            .unwrap_or_else(|| self.fallback_language().to_owned())
    }

    pub fn provider(&self) -> Arc<dyn MessageProvider> {
        self.provider
            .clone()
            .unwrap_or_else(|| Arc::new(EmptyProvider))
    }

    pub fn default_key_prefix(&self) -> Option<&str> {
        self.default_key_prefix.as_deref()
    }

    pub fn supplemental_source(&self) -> bool {
        self.supplemental_source.unwrap_or(false)
    }

    pub fn load_mode(&self) -> LoadMode {
        self.load_mode.unwrap_or_default()
    }

    /// Overwrite every field that is set in `other`.
    pub fn merge(&mut self, other: Options) {
        let Options {
            active_language,
            fallback_language,
            provider,
            on_language_loaded,
            default_key_prefix,
            supplemental_source,
            document,
            load_mode,
        } = other;

        if active_language.is_some() {
            self.active_language = active_language;
        }
        if fallback_language.is_some() {
            self.fallback_language = fallback_language;
        }
        if provider.is_some() {
            self.provider = provider;
        }
        if on_language_loaded.is_some() {
            self.on_language_loaded = on_language_loaded;
        }
        if default_key_prefix.is_some() {
            self.default_key_prefix = default_key_prefix;
        }
        if supplemental_source.is_some() {
            self.supplemental_source = supplemental_source;
        }
        if document.is_some() {
            self.document = document;
        }
        if load_mode.is_some() {
            self.load_mode = load_mode;
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("active_language", &self.active_language)
            .field("fallback_language", &self.fallback_language)
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.provider_name().to_string()),
            )
            .field("on_language_loaded", &self.on_language_loaded.is_some())
            .field("default_key_prefix", &self.default_key_prefix)
            .field("supplemental_source", &self.supplemental_source)
            .field("document", &self.document.is_some())
            .field("load_mode", &self.load_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::new();
        assert_eq!(options.fallback_language(), "en");
        assert_eq!(options.active_language(), "en");
        assert_eq!(options.default_key_prefix(), None);
        assert!(!options.supplemental_source());
        assert_eq!(options.load_mode(), LoadMode::Blocking);
        assert_eq!(options.provider().provider_name(), "Empty Provider");
    }

    #[test]
    fn test_active_language_falls_back() {
        let options = Options::new().with_fallback_language("de");
        assert_eq!(options.active_language(), "de");

        let options = options.with_active_language("fr");
        assert_eq!(options.active_language(), "fr");
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let mut options = Options::new()
            .with_active_language("fr")
            .with_fallback_language("de")
            .with_default_key_prefix("app.");

        options.merge(Options::new().with_fallback_language("es"));

        assert_eq!(options.active_language(), "fr");
        assert_eq!(options.fallback_language(), "es");
        assert_eq!(options.default_key_prefix(), Some("app."));
    }

    struct DeclaredLanguage(&'static str);

    impl LanguageAttribute for DeclaredLanguage {
        fn set_language(&self, _tag: &str) {}

        fn language(&self) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    #[test]
    fn test_active_language_defaults_to_document_language() {
        let options = Options::new().with_document(Arc::new(DeclaredLanguage("pt-BR")));
        assert_eq!(options.active_language(), "pt_BR");

        let options = options.with_active_language("fr");
        assert_eq!(options.active_language(), "fr");

        let blank = Options::new()
            .with_fallback_language("de")
            .with_document(Arc::new(DeclaredLanguage("")));
        assert_eq!(blank.active_language(), "de");
    }
}
