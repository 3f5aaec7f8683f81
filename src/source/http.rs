//! HTTP message provider
//!
//! Fetches `<base_url>/<tag>.json` with `reqwest`. A `404` means the language
//! does not exist and yields an empty message set; any other non-success
//! status is a provider failure.
//!
//! # Example
//!
//! ```ignore
//! use kiwi_i18n::{I18n, LoadMode, Options};
//! use kiwi_i18n::source::HttpProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = HttpProvider::new("https://example.com/lang")?;
//!     let i18n = I18n::new(
//!         Options::new()
//!             .with_provider(Arc::new(provider))
//!             .with_load_mode(LoadMode::Deferred),
//!     );
//!     i18n.load_language_async("fr").await;
//!     println!("{}", i18n.translate("auth.failed", &Default::default()));
//!     Ok(())
//! }
//! ```

use crate::error::{I18nError, I18nResult};
use crate::messages::MessageSet;
use crate::source::MessageProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

#[derive(Clone)]
pub struct HttpProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Directory URL the language files live under, without trailing slash
    base_url: String,
}

impl HttpProvider {
    /// Create a provider reading language files below `base_url`
    ///
    /// # Errors
    /// * `I18nError::Config` - if the URL is empty
    /// * `I18nError::Network` - if the HTTP client cannot be built
    pub fn new(base_url: &str) -> I18nResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(I18nError::Config("Base URL cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| I18nError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn language_url(&self, tag: &str) -> String {
        format!("{}/{}.json", self.base_url, tag)
    }
}

#[async_trait]
impl MessageProvider for HttpProvider {
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet> {
        let url = self.language_url(tag);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url = %url, "language file not found");
            return Ok(MessageSet::new());
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(I18nError::ProviderFailure(format!(
                "GET {} failed ({}): {}",
                url, status, error_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| I18nError::Parse(format!("Invalid JSON from {}: {}", url, e)))?;

        MessageSet::from_json_value(&json)
    }

    fn provider_name(&self) -> &str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_base_url_fails() {
        let result = HttpProvider::new("   ");
        assert!(matches!(result, Err(I18nError::Config(_))));
    }

    #[test]
    fn test_language_url_trims_trailing_slash() {
        let provider = HttpProvider::new("https://example.com/lang/").unwrap();
        assert_eq!(
            provider.language_url("pt_BR"),
            "https://example.com/lang/pt_BR.json"
        );
    }

    #[test]
    fn test_http_provider_is_async_only() {
        let provider = HttpProvider::new("https://example.com/lang").unwrap();
        assert!(provider.fetch_blocking("en").is_none());
        assert_eq!(provider.provider_name(), "HTTP");
    }
}
