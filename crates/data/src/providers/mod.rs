//! Price resolver trait and its implementations.

mod coingecko;
mod static_provider;

pub use coingecko::CoinGeckoProvider;
pub use static_provider::{StaticFailure, StaticPriceProvider};

use crate::errors::ResolverError;
use async_trait::async_trait;
use chrono::NaiveDate;
use il_calc_domain::entities::{Token, TokenId};
use il_calc_domain::value_objects::Price;

/// Source of historical USD prices and of the token catalog.
///
/// The calculator only ever needs two things from a price index: the list of
/// selectable tokens and a token's USD price on a calendar date.
#[async_trait]
pub trait PriceResolver: Send + Sync {
    /// Constant identifier used in logs and error messages.
    fn id(&self) -> &'static str;

    /// Fetches the full token catalog.
    ///
    /// Fails with [`ResolverError::CatalogUnavailable`] when the index cannot
    /// be reached.
    async fn list_tokens(&self) -> Result<Vec<Token>, ResolverError>;

    /// Fetches the USD unit price of `token` on `date`.
    ///
    /// # Errors
    ///
    /// * [`ResolverError::UnknownToken`] for ids the index does not know
    /// * [`ResolverError::PriceUnavailable`] when the token had no price that day
    /// * [`ResolverError::ServiceUnavailable`], [`ResolverError::RateLimited`] or
    ///   [`ResolverError::Network`] for transient failures
    async fn historical_price(&self, token: &TokenId, date: NaiveDate)
    -> Result<Price, ResolverError>;
}
