/// Error types for message loading and provider access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// A message provider failed to produce messages for a language
    ProviderFailure(String),
    /// Filesystem access failed
    Io(String),
    /// A message source could not be parsed
    Parse(String),
    /// An HTTP request failed
    Network(String),
    /// Invalid configuration
    Config(String),
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            I18nError::ProviderFailure(msg) => write!(f, "Provider failure: {}", msg),
            I18nError::Io(msg) => write!(f, "I/O error: {}", msg),
            I18nError::Parse(msg) => write!(f, "Parse error: {}", msg),
            I18nError::Network(msg) => write!(f, "Network error: {}", msg),
            I18nError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for I18nError {}

impl From<std::io::Error> for I18nError {
    fn from(err: std::io::Error) -> Self {
        I18nError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for I18nError {
    fn from(err: serde_json::Error) -> Self {
        I18nError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for I18nError {
    fn from(err: reqwest::Error) -> Self {
        I18nError::Network(err.to_string())
    }
}

/// Result type for loading operations
pub type I18nResult<T> = Result<T, I18nError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = I18nError::ProviderFailure("fr unavailable".to_string());
        assert_eq!(err.to_string(), "Provider failure: fr unavailable");
        assert_eq!(
            I18nError::Config("empty base url".to_string()).to_string(),
            "Configuration error: empty base url"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: I18nError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, I18nError::Parse(_)));
    }
}
