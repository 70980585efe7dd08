//! In-memory price resolver.
//!
//! Serves a fixed catalog and price table. Used by tests and by the CLI's
//! offline mode.

use async_trait::async_trait;
use chrono::NaiveDate;
use il_calc_domain::entities::{Token, TokenId};
use il_calc_domain::value_objects::Price;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ResolverError;
use crate::providers::PriceResolver;

/// Provider ID constant
const PROVIDER_ID: &str = "STATIC";

/// Failure a [`StaticPriceProvider`] reports for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticFailure {
    /// Report the index as unreachable.
    ServiceUnavailable,
    /// Report rate limiting.
    RateLimited,
}

/// Price resolver backed by in-memory tables.
#[derive(Debug, Default)]
pub struct StaticPriceProvider {
    tokens: Vec<Token>,
    dated_prices: HashMap<(TokenId, NaiveDate), Price>,
    constant_prices: HashMap<TokenId, Price>,
    failures: HashMap<TokenId, StaticFailure>,
    catalog_offline: bool,
    lookups: AtomicUsize,
}

impl StaticPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog entry.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Sets the price of `token` on one date.
    #[must_use]
    pub fn with_price(mut self, token: impl Into<TokenId>, date: NaiveDate, usd: Decimal) -> Self {
        self.dated_prices
            .insert((token.into(), date), Price::new(usd));
        self
    }

    /// Sets the price of `token` on every date without a dated entry.
    #[must_use]
    pub fn with_constant_price(mut self, token: impl Into<TokenId>, usd: Decimal) -> Self {
        self.constant_prices.insert(token.into(), Price::new(usd));
        self
    }

    /// Makes every lookup of `token` fail.
    #[must_use]
    pub fn with_failure(mut self, token: impl Into<TokenId>, failure: StaticFailure) -> Self {
        self.failures.insert(token.into(), failure);
        self
    }

    /// Makes [`PriceResolver::list_tokens`] fail.
    #[must_use]
    pub fn with_catalog_offline(mut self) -> Self {
        self.catalog_offline = true;
        self
    }

    /// Number of price lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn is_known(&self, token: &TokenId) -> bool {
        self.tokens.iter().any(|t| &t.id == token)
            || self.constant_prices.contains_key(token)
            || self.dated_prices.keys().any(|(id, _)| id == token)
    }
}

#[async_trait]
impl PriceResolver for StaticPriceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn list_tokens(&self) -> Result<Vec<Token>, ResolverError> {
        if self.catalog_offline {
            return Err(ResolverError::CatalogUnavailable(
                "static catalog disabled".to_string(),
            ));
        }
        Ok(self.tokens.clone())
    }

    async fn historical_price(
        &self,
        token: &TokenId,
        date: NaiveDate,
    ) -> Result<Price, ResolverError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        match self.failures.get(token) {
            Some(StaticFailure::ServiceUnavailable) => {
                return Err(ResolverError::ServiceUnavailable {
                    provider: PROVIDER_ID.to_string(),
                    message: "injected failure".to_string(),
                });
            }
            Some(StaticFailure::RateLimited) => {
                return Err(ResolverError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            None => {}
        }

        if !self.is_known(token) {
            return Err(ResolverError::UnknownToken(token.to_string()));
        }

        self.dated_prices
            .get(&(token.clone(), date))
            .or_else(|| self.constant_prices.get(token))
            .copied()
            .ok_or_else(|| ResolverError::PriceUnavailable {
                token: token.to_string(),
                date,
            })
    }
}
