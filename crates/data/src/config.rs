//! CoinGecko client configuration.

use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
/// Paid API root.
pub const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
/// Header carrying a demo plan key.
pub const DEMO_KEY_HEADER: &str = "x-cg-demo-api-key";
/// Header carrying a paid plan key.
pub const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";
/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`CoinGeckoProvider`](crate::providers::CoinGeckoProvider).
#[derive(Clone)]
pub struct CoinGeckoConfig {
    /// API root without trailing slash.
    pub base_url: String,
    /// Optional API key.
    pub api_key: Option<String>,
    /// Header the key is sent in.
    pub api_key_header: &'static str,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: DEMO_KEY_HEADER,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for CoinGeckoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinGeckoConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_header", &self.api_key_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CoinGeckoConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Recognised variables:
    /// * `COINGECKO_BASE_URL` - API root override
    /// * `COINGECKO_API_KEY` - API key
    /// * `COINGECKO_PRO` - `true`/`1` to use the paid endpoint and key header
    /// * `COINGECKO_TIMEOUT_SECS` - request timeout in seconds
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pro = lookup("COINGECKO_PRO")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let base_url = lookup("COINGECKO_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                let root = if pro { PRO_BASE_URL } else { DEFAULT_BASE_URL };
                root.to_string()
            });

        let timeout = match lookup("COINGECKO_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "Invalid COINGECKO_TIMEOUT_SECS, using default");
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: lookup("COINGECKO_API_KEY").filter(|v| !v.trim().is_empty()),
            api_key_header: if pro { PRO_KEY_HEADER } else { DEMO_KEY_HEADER },
            timeout,
        }
    }

    /// Overrides the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
