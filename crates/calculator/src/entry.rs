//! Entry valuation stage.
//!
//! Given the start-date prices of both tokens and a quantity of token A, the
//! stage derives the quantity of token B that makes a 50/50 value split and
//! the total USD value of the position.
//!
//! Which lookups run depends on how many inputs are filled in; see
//! [`EntryInputs`].

use chrono::NaiveDate;
use il_calc_data::PriceResolver;
use il_calc_domain::entities::TokenId;
use il_calc_domain::math::constant_product::balance_quantity;
use il_calc_domain::metrics::impermanent_loss::value_of;
use il_calc_domain::value_objects::Price;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::CalcError;
use crate::state::EntryState;

/// Completeness of the entry inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryInputs {
    /// Token A is not selected: nothing to value.
    Empty,
    /// Only token A is usable: its price is shown, nothing else.
    TokenA {
        /// Token A
        token_a: TokenId,
    },
    /// Both tokens selected without a quantity: both prices are shown.
    Pair {
        /// Token A
        token_a: TokenId,
        /// Token B
        token_b: TokenId,
    },
    /// Everything needed to size the position.
    Complete {
        /// Token A
        token_a: TokenId,
        /// Token B
        token_b: TokenId,
        /// Quantity of token A
        qty_a: Decimal,
    },
}

impl EntryInputs {
    /// Classifies the entry inputs.
    ///
    /// A quantity without token B cannot be paired with anything, so that
    /// state is treated as [`EntryInputs::TokenA`].
    ///
    /// # Errors
    /// Returns [`CalcError::InvalidInput`] for a negative quantity.
    pub fn classify(state: &EntryState) -> Result<Self, CalcError> {
        if let Some(qty) = state.qty_a
            && qty < Decimal::ZERO
        {
            return Err(CalcError::InvalidInput(format!(
                "quantity of token A cannot be negative: {qty}"
            )));
        }

        let inputs = match (&state.token_a, &state.token_b, state.qty_a) {
            (None, _, _) => Self::Empty,
            (Some(token_a), None, _) => Self::TokenA {
                token_a: token_a.clone(),
            },
            (Some(token_a), Some(token_b), None) => Self::Pair {
                token_a: token_a.clone(),
                token_b: token_b.clone(),
            },
            (Some(token_a), Some(token_b), Some(qty_a)) => Self::Complete {
                token_a: token_a.clone(),
                token_b: token_b.clone(),
                qty_a,
            },
        };
        Ok(inputs)
    }

    /// Tokens whose start-date price this state needs.
    pub fn lookups(&self) -> Vec<&TokenId> {
        match self {
            Self::Empty => Vec::new(),
            Self::TokenA { token_a } => vec![token_a],
            Self::Pair { token_a, token_b } | Self::Complete { token_a, token_b, .. } => {
                vec![token_a, token_b]
            }
        }
    }
}

/// Derived entry values. Never mutated directly; recomputed from inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryValuation {
    /// Date the prices were taken on.
    pub start_date: NaiveDate,
    /// USD price of token A on the start date.
    pub price_a: Price,
    /// USD price of token B on the start date.
    pub price_b: Price,
    /// Quantity of token A as entered.
    pub qty_a: Decimal,
    /// Quantity of token B matching the value of `qty_a`.
    pub qty_b: Decimal,
    /// price_a * qty_a + price_b * qty_b
    pub total_value_usd: Decimal,
}

impl EntryValuation {
    /// The all-zero valuation.
    #[must_use]
    pub fn zero(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            price_a: Price::ZERO,
            price_b: Price::ZERO,
            qty_a: Decimal::ZERO,
            qty_b: Decimal::ZERO,
            total_value_usd: Decimal::ZERO,
        }
    }

    /// Whether both sides of the position hold a positive quantity.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.qty_a > Decimal::ZERO && self.qty_b > Decimal::ZERO
    }
}

/// Sizes a balanced position from resolved start-date prices.
///
/// qty_b = price_a * qty_a / price_b
/// total = price_a * qty_a + price_b * qty_b
///
/// # Errors
/// Returns [`CalcError::DivisionByZero`] when token B is priced at zero.
pub fn size_position(
    start_date: NaiveDate,
    price_a: Price,
    qty_a: Decimal,
    price_b: Price,
) -> Result<EntryValuation, CalcError> {
    let qty_b = balance_quantity(price_a, qty_a, price_b)?;
    let total_value_usd = value_of(qty_a, price_a, qty_b, price_b)?;
    Ok(EntryValuation {
        start_date,
        price_a,
        price_b,
        qty_a,
        qty_b,
        total_value_usd,
    })
}

/// Evaluates the entry stage, looking up the prices the inputs call for.
///
/// Both lookups of a pair run concurrently. Any resolver failure fails the
/// whole evaluation; no partially resolved valuation is returned.
///
/// # Errors
/// Returns the resolver failure mapped into [`CalcError`], or an input or
/// arithmetic error.
pub async fn compute_entry_valuation(
    state: &EntryState,
    resolver: &dyn PriceResolver,
) -> Result<EntryValuation, CalcError> {
    let date = state.start_date;
    let inputs = EntryInputs::classify(state)?;
    debug!(?inputs, date = %date, provider = resolver.id(), "Evaluating entry valuation");

    match inputs {
        EntryInputs::Empty => Ok(EntryValuation::zero(date)),
        EntryInputs::TokenA { token_a } => {
            let price_a = resolver.historical_price(&token_a, date).await?;
            Ok(EntryValuation {
                price_a,
                ..EntryValuation::zero(date)
            })
        }
        EntryInputs::Pair { token_a, token_b } => {
            let (price_a, price_b) = tokio::try_join!(
                resolver.historical_price(&token_a, date),
                resolver.historical_price(&token_b, date),
            )?;
            Ok(EntryValuation {
                price_a,
                price_b,
                ..EntryValuation::zero(date)
            })
        }
        EntryInputs::Complete {
            token_a,
            token_b,
            qty_a,
        } => {
            let (price_a, price_b) = tokio::try_join!(
                resolver.historical_price(&token_a, date),
                resolver.historical_price(&token_b, date),
            )?;
            size_position(date, price_a, qty_a, price_b)
        }
    }
}
