//! Calculator input state.
//!
//! This module holds the two mutable input groups of a calculation session:
//! the entry inputs (date, tokens, quantity) and the projection inputs
//! (future date, future prices, yield rate).

use chrono::NaiveDate;
use il_calc_domain::entities::TokenId;
use il_calc_domain::enums::RateMode;
use il_calc_domain::value_objects::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs of the entry valuation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryState {
    /// Date the position is opened; prices are looked up on this day.
    pub start_date: NaiveDate,
    /// First token of the pair.
    pub token_a: Option<TokenId>,
    /// Second token of the pair.
    pub token_b: Option<TokenId>,
    /// Quantity of token A deposited.
    pub qty_a: Option<Decimal>,
}

impl EntryState {
    /// Creates an entry state with no token selected.
    #[must_use]
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            token_a: None,
            token_b: None,
            qty_a: None,
        }
    }

    /// Sets token A.
    #[must_use]
    pub fn with_token_a(mut self, token: impl Into<TokenId>) -> Self {
        self.token_a = Some(token.into());
        self
    }

    /// Sets token B.
    #[must_use]
    pub fn with_token_b(mut self, token: impl Into<TokenId>) -> Self {
        self.token_b = Some(token.into());
        self
    }

    /// Sets the quantity of token A.
    #[must_use]
    pub fn with_qty_a(mut self, qty: Decimal) -> Self {
        self.qty_a = Some(qty);
        self
    }
}

/// Inputs of the projection stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionState {
    /// Date the position is valued at.
    pub future_date: NaiveDate,
    /// Hypothesized USD price of token A.
    pub price_a_future: Option<Decimal>,
    /// Hypothesized USD price of token B.
    pub price_b_future: Option<Decimal>,
    /// Yield rate in percent.
    pub rate: Percentage,
    /// How the rate accrues.
    pub rate_mode: RateMode,
}

impl ProjectionState {
    /// Creates a projection state without prices and with a zero APR.
    #[must_use]
    pub fn new(future_date: NaiveDate) -> Self {
        Self {
            future_date,
            price_a_future: None,
            price_b_future: None,
            rate: Percentage::ZERO,
            rate_mode: RateMode::Apr,
        }
    }

    /// Sets both future prices.
    #[must_use]
    pub fn with_future_prices(mut self, price_a: Decimal, price_b: Decimal) -> Self {
        self.price_a_future = Some(price_a);
        self.price_b_future = Some(price_b);
        self
    }

    /// Sets the yield rate.
    #[must_use]
    pub fn with_rate(mut self, rate: Decimal, mode: RateMode) -> Self {
        self.rate = Percentage::new(rate);
        self.rate_mode = mode;
        self
    }
}
