//! Cart configuration

use std::time::Duration;

use crate::types::product::Currency;

/// Configuration for the cart store and its collaborators.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Base URL of the commerce backend, e.g. `https://shop.example.com`.
    pub api_base_url:    String,
    /// Currency the storefront trades in.
    pub currency:        Currency,
    /// Symbol prefixed to displayed amounts.
    pub currency_symbol: String,
    /// Key the cart is persisted under in the local store.
    pub storage_key:     String,
    /// How long a fetched stock figure counts as last-known after a failed
    /// refresh.
    pub stock_freshness: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_base_url:    String::new(),
            currency:        Currency::usd(),
            currency_symbol: "$".to_string(),
            storage_key:     "cart".to_string(),
            stock_freshness: Duration::from_secs(30),
        }
    }
}

impl CartConfig {
    /// Builds a configuration from the environment, falling back to defaults
    /// for anything unset.
    ///
    /// Reads `STOREFRONT_API_URL` and `STOREFRONT_CURRENCY`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(symbol) = std::env::var("STOREFRONT_CURRENCY") {
            config.currency_symbol = symbol;
        }
        config
    }

    /// Sets the backend base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();

        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.currency, Currency::usd());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = CartConfig::default().with_api_base_url("https://shop.example.com/");
        assert_eq!(config.api_base_url, "https://shop.example.com");
    }
}
