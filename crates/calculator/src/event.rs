//! Input change events.
//!
//! This module defines the discrete changes the presentation layer can make
//! to a calculation session, and which stage each change invalidates.

use chrono::NaiveDate;
use il_calc_domain::entities::TokenId;
use il_calc_domain::enums::RateMode;
use rust_decimal::Decimal;

/// A single change to one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Start date changed.
    StartDate(NaiveDate),
    /// Future date changed.
    FutureDate(NaiveDate),
    /// Token A selected or cleared.
    TokenA(Option<TokenId>),
    /// Token B selected or cleared.
    TokenB(Option<TokenId>),
    /// Quantity of token A entered or cleared.
    QuantityA(Option<Decimal>),
    /// Future price of token A entered or cleared.
    FuturePriceA(Option<Decimal>),
    /// Future price of token B entered or cleared.
    FuturePriceB(Option<Decimal>),
    /// Yield rate in percent.
    Rate(Decimal),
    /// APR or APY.
    RateMode(RateMode),
}

/// Stage that must be re-evaluated after an input change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute {
    /// The value did not change.
    Nothing,
    /// Entry inputs changed; the projection follows once the entry is applied.
    Entry,
    /// Only projection inputs changed.
    Projection,
}

impl InputEvent {
    /// Stage this event feeds.
    #[must_use]
    pub fn stage(&self) -> Recompute {
        match self {
            Self::StartDate(_) | Self::TokenA(_) | Self::TokenB(_) | Self::QuantityA(_) => {
                Recompute::Entry
            }
            Self::FutureDate(_)
            | Self::FuturePriceA(_)
            | Self::FuturePriceB(_)
            | Self::Rate(_)
            | Self::RateMode(_) => Recompute::Projection,
        }
    }
}
