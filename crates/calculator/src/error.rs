//! Errors surfaced by the calculation stages.

use chrono::NaiveDate;
use il_calc_data::ResolverError;
use il_calc_domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Failure of one stage evaluation.
///
/// Stage errors never abort the session; they are stored next to the last
/// good valuation so the presentation layer can render an indicator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// A user input is outside its valid range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The price index does not know the token.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// The token had no recorded price on the date.
    #[error("No price for {token} on {date}")]
    PriceUnavailable {
        /// Token id
        token: String,
        /// Requested date
        date: NaiveDate,
    },

    /// The price index could not be reached or answered with garbage.
    #[error("Price service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The token list could not be fetched.
    #[error("Token catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A denominator was zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Negative invariant or decimal overflow.
    #[error("Arithmetic domain error: {0}")]
    ArithmeticDomain(String),
}

/// Copyable discriminant of [`CalcError`] for display binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    UnknownToken,
    PriceUnavailable,
    ServiceUnavailable,
    CatalogUnavailable,
    DivisionByZero,
    ArithmeticDomain,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UnknownToken(_) => ErrorKind::UnknownToken,
            Self::PriceUnavailable { .. } => ErrorKind::PriceUnavailable,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::CatalogUnavailable(_) => ErrorKind::CatalogUnavailable,
            Self::DivisionByZero(_) => ErrorKind::DivisionByZero,
            Self::ArithmeticDomain(_) => ErrorKind::ArithmeticDomain,
        }
    }

    /// Whether a fresh input event may clear the error without changing inputs.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<DomainError> for CalcError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(msg) => Self::InvalidInput(msg),
            DomainError::DivisionByZero(what) => Self::DivisionByZero(what),
            DomainError::ArithmeticDomain(msg) => Self::ArithmeticDomain(msg),
        }
    }
}

impl From<ResolverError> for CalcError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::UnknownToken(token) => Self::UnknownToken(token),
            ResolverError::PriceUnavailable { token, date } => {
                Self::PriceUnavailable { token, date }
            }
            ResolverError::CatalogUnavailable(msg) => Self::CatalogUnavailable(msg),
            transient @ (ResolverError::ServiceUnavailable { .. }
            | ResolverError::RateLimited { .. }
            | ResolverError::Network(_)) => Self::ServiceUnavailable(transient.to_string()),
        }
    }
}
