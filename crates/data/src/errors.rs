//! Errors reported by price resolvers.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while talking to a price index.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The token id is not known to the index.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// The token exists but has no recorded price on that date
    /// (usually because it was not listed yet).
    #[error("No price for {token} on {date}")]
    PriceUnavailable {
        /// Token id that was looked up
        token: String,
        /// Requested date
        date: NaiveDate,
    },

    /// The index answered with a failure or an unreadable body.
    #[error("Service unavailable: {provider} - {message}")]
    ServiceUnavailable {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The index rejected the request because of rate limiting (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The token list could not be fetched.
    #[error("Token catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A network error occurred while communicating with the index.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ResolverError {
    /// Whether the same request may succeed later.
    ///
    /// `PriceUnavailable` and `UnknownToken` are permanent for a given
    /// (token, date) pair; service and network failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ServiceUnavailable { .. } | Self::RateLimited { .. } | Self::Network(_) => true,
            Self::UnknownToken(_) | Self::PriceUnavailable { .. } | Self::CatalogUnavailable(_) => {
                false
            }
        }
    }
}
