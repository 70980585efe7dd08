//! CoinGecko provider.
//!
//! Uses two public endpoints:
//! - `GET /coins/list` for the token catalog
//! - `GET /coins/{id}/history?date=dd-mm-yyyy` for a daily USD price
//!
//! A history response without `market_data` means the coin was not listed
//! on the requested date.

use async_trait::async_trait;
use chrono::NaiveDate;
use il_calc_domain::entities::{Token, TokenId};
use il_calc_domain::value_objects::Price;
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::CoinGeckoConfig;
use crate::errors::ResolverError;
use crate::providers::PriceResolver;

/// Provider ID constant
const PROVIDER_ID: &str = "COINGECKO";

/// Date format expected by the history endpoint.
const HISTORY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Entry of `/coins/list`.
#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
    name: String,
}

/// Body of `/coins/{id}/history`.
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    market_data: Option<HistoryMarketData>,
}

#[derive(Debug, Deserialize)]
struct HistoryMarketData {
    #[serde(default)]
    current_price: HashMap<String, f64>,
}

/// CoinGecko price resolver.
///
/// # Example
///
/// ```ignore
/// use il_calc_data::{CoinGeckoConfig, providers::CoinGeckoProvider};
///
/// let provider = CoinGeckoProvider::new(CoinGeckoConfig::from_env());
/// ```
pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoProvider {
    /// Creates a provider from its configuration.
    pub fn new(config: CoinGeckoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, timeout = ?config.timeout, "HTTP client setup failed, using defaults without timeout");
                Client::new()
            });

        Self { client, config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self.client.get(url);
        match &self.config.api_key {
            Some(key) => request.header(self.config.api_key_header, key),
            None => request,
        }
    }
}

#[async_trait]
impl PriceResolver for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn list_tokens(&self) -> Result<Vec<Token>, ResolverError> {
        debug!(provider = PROVIDER_ID, "Fetching token catalog");

        let response = self
            .get("/coins/list")
            .send()
            .await
            .map_err(|e| ResolverError::CatalogUnavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolverError::CatalogUnavailable(e.to_string()))?;

        let tokens = parse_coin_list(status, &body)?;
        info!(provider = PROVIDER_ID, count = tokens.len(), "Token catalog fetched");
        Ok(tokens)
    }

    async fn historical_price(
        &self,
        token: &TokenId,
        date: NaiveDate,
    ) -> Result<Price, ResolverError> {
        let id = token.as_str();
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(ResolverError::UnknownToken(id.to_string()));
        }

        let date_param = date.format(HISTORY_DATE_FORMAT).to_string();
        debug!(provider = PROVIDER_ID, token = id, date = %date_param, "Fetching historical price");

        let response = self
            .get(&format!("/coins/{id}/history"))
            .query(&[("date", date_param.as_str()), ("localization", "false")])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let result = parse_history(token, date, status, &body);
        if let Err(e) = &result {
            warn!(provider = PROVIDER_ID, token = id, date = %date, error = %e, "Historical price lookup failed");
        }
        result
    }
}

/// Maps a `/coins/list` response to catalog tokens.
fn parse_coin_list(status: StatusCode, body: &str) -> Result<Vec<Token>, ResolverError> {
    if !status.is_success() {
        return Err(ResolverError::CatalogUnavailable(format!("HTTP {status}")));
    }
    let entries: Vec<CoinListEntry> = serde_json::from_str(body)
        .map_err(|e| ResolverError::CatalogUnavailable(format!("invalid catalog body: {e}")))?;
    Ok(entries
        .into_iter()
        .map(|entry| Token::new(entry.id, entry.symbol, entry.name))
        .collect())
}

/// Maps a `/coins/{id}/history` response to a USD price.
fn parse_history(
    token: &TokenId,
    date: NaiveDate,
    status: StatusCode,
    body: &str,
) -> Result<Price, ResolverError> {
    if status == StatusCode::NOT_FOUND {
        return Err(ResolverError::UnknownToken(token.to_string()));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ResolverError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ResolverError::ServiceUnavailable {
            provider: PROVIDER_ID.to_string(),
            message: format!("HTTP {status}"),
        });
    }

    let parsed: HistoryResponse =
        serde_json::from_str(body).map_err(|e| ResolverError::ServiceUnavailable {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid history body: {e}"),
        })?;

    let usd = parsed
        .market_data
        .and_then(|data| data.current_price.get("usd").copied())
        .ok_or_else(|| ResolverError::PriceUnavailable {
            token: token.to_string(),
            date,
        })?;

    Decimal::from_f64(usd)
        .filter(|value| *value >= Decimal::ZERO)
        .map(Price::new)
        .ok_or_else(|| ResolverError::ServiceUnavailable {
            provider: PROVIDER_ID.to_string(),
            message: format!("malformed USD price {usd}"),
        })
}
