//! Projection stage.
//!
//! Marks the entry position at hypothesized future prices two ways: as a
//! constant-product pool that rebalanced to the new price ratio, and as the
//! untouched entry bundle. The difference is the impermanent loss. Yield is
//! accrued on the pool value over the days between entry and the future date.

use chrono::NaiveDate;
use il_calc_domain::math::constant_product::{calculate_k, rebalance};
use il_calc_domain::metrics::impermanent_loss::{calculate_il, value_of};
use il_calc_domain::metrics::interest::calculate_interest;
use il_calc_domain::value_objects::{Percentage, Price};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::entry::EntryValuation;
use crate::error::CalcError;
use crate::state::ProjectionState;

/// Completeness of the projection inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionInputs {
    /// A quantity or a future price is missing or zero.
    Incomplete,
    /// All four values are present and positive.
    Complete {
        /// Entry quantity of token A
        qty_a: Decimal,
        /// Entry quantity of token B
        qty_b: Decimal,
        /// Future price of token A
        price_a_future: Price,
        /// Future price of token B
        price_b_future: Price,
    },
}

impl ProjectionInputs {
    /// Classifies the projection inputs against an entry valuation.
    ///
    /// # Errors
    /// Returns [`CalcError::InvalidInput`] for negative future prices or a
    /// negative rate.
    pub fn classify(entry: &EntryValuation, state: &ProjectionState) -> Result<Self, CalcError> {
        let price_a_future = state.price_a_future.map(Price::try_new).transpose()?;
        let price_b_future = state.price_b_future.map(Price::try_new).transpose()?;
        if state.rate.0 < Decimal::ZERO {
            return Err(CalcError::InvalidInput(format!(
                "yield rate cannot be negative: {}",
                state.rate.0
            )));
        }

        let inputs = match (price_a_future, price_b_future) {
            (Some(price_a_future), Some(price_b_future))
                if entry.has_position()
                    && !price_a_future.is_zero()
                    && !price_b_future.is_zero() =>
            {
                Self::Complete {
                    qty_a: entry.qty_a,
                    qty_b: entry.qty_b,
                    price_a_future,
                    price_b_future,
                }
            }
            _ => Self::Incomplete,
        };
        Ok(inputs)
    }
}

/// Derived projection values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectionValuation {
    /// Days between the start date and the future date.
    pub days: u32,
    /// Token A held by the pool after rebalancing.
    pub qty_a_future: Decimal,
    /// Token B held by the pool after rebalancing.
    pub qty_b_future: Decimal,
    /// Pool position value at future prices.
    pub value_before_interest: Decimal,
    /// Entry quantity of token A at its future price.
    pub value_a_held: Decimal,
    /// Entry quantity of token B at its future price.
    pub value_b_held: Decimal,
    /// value_a_held + value_b_held
    pub value_if_held: Decimal,
    /// il_dollar / value_if_held
    pub il_percent: Percentage,
    /// value_if_held - value_before_interest
    pub il_dollar: Decimal,
    /// interest_dollar / value_before_interest
    pub interest_percent: Percentage,
    /// Yield accrued on the pool value.
    pub interest_dollar: Decimal,
    /// value_before_interest + interest_dollar
    pub value_with_interest: Decimal,
    /// value_with_interest - value_if_held
    pub diff_vs_holding: Decimal,
}

impl ProjectionValuation {
    /// The all-zero valuation.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Whole days from `start` to `end`.
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] when `end` is before `start`.
pub fn elapsed_days(start: NaiveDate, end: NaiveDate) -> Result<u32, CalcError> {
    let days = end.signed_duration_since(start).num_days();
    u32::try_from(days).map_err(|_| {
        CalcError::InvalidInput(format!("future date {end} is before start date {start}"))
    })
}

/// Evaluates the projection stage.
///
/// Incomplete inputs produce the all-zero valuation rather than an error.
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] for a future date before the start
/// date, negative prices or a negative rate, and arithmetic errors from the
/// pool math.
pub fn compute_projection(
    entry: &EntryValuation,
    state: &ProjectionState,
) -> Result<ProjectionValuation, CalcError> {
    let days = elapsed_days(entry.start_date, state.future_date)?;
    let inputs = ProjectionInputs::classify(entry, state)?;
    debug!(?inputs, days, rate = %state.rate.0, mode = %state.rate_mode, "Evaluating projection");

    let (qty_a, qty_b, price_a_future, price_b_future) = match inputs {
        ProjectionInputs::Incomplete => return Ok(ProjectionValuation::zero()),
        ProjectionInputs::Complete {
            qty_a,
            qty_b,
            price_a_future,
            price_b_future,
        } => (qty_a, qty_b, price_a_future, price_b_future),
    };

    let k = calculate_k(qty_a, qty_b)?;
    let (qty_a_future, qty_b_future) = rebalance(k, price_a_future, price_b_future)?;
    let value_before_interest = value_of(qty_a_future, price_a_future, qty_b_future, price_b_future)?;

    let value_a_held = value_of(qty_a, price_a_future, Decimal::ZERO, Price::ZERO)?;
    let value_b_held = value_of(Decimal::ZERO, Price::ZERO, qty_b, price_b_future)?;
    let value_if_held = checked(value_a_held.checked_add(value_b_held), "value if held")?;

    let il = calculate_il(value_if_held, value_before_interest)?;
    let interest = calculate_interest(value_before_interest, state.rate, state.rate_mode, days)?;

    let value_with_interest = checked(
        value_before_interest.checked_add(interest.interest_usd),
        "value with interest",
    )?;
    let diff_vs_holding = checked(
        value_with_interest.checked_sub(value_if_held),
        "difference vs holding",
    )?;

    Ok(ProjectionValuation {
        days,
        qty_a_future,
        qty_b_future,
        value_before_interest,
        value_a_held,
        value_b_held,
        value_if_held,
        il_percent: il.percentage_loss,
        il_dollar: il.absolute_loss_usd,
        interest_percent: interest.interest_percent,
        interest_dollar: interest.interest_usd,
        value_with_interest,
        diff_vs_holding,
    })
}

fn checked(value: Option<Decimal>, operation: &str) -> Result<Decimal, CalcError> {
    value.ok_or_else(|| CalcError::ArithmeticDomain(format!("overflow in {operation}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::size_position;
    use crate::error::ErrorKind;
    use il_calc_domain::enums::RateMode;
    use il_calc_domain::metrics::impermanent_loss::il_ratio;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
    }

    /// 10 A at $100 against 1000 B at $1.
    fn entry() -> EntryValuation {
        size_position(start(), Price::new(dec!(100)), dec!(10), Price::new(dec!(1))).unwrap()
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "expected {expected}, got {actual} (diff {diff})"
        );
    }

    #[test]
    fn test_price_rise_scenario() {
        let state = ProjectionState::new(start()).with_future_prices(dec!(150), dec!(1));
        let projection = compute_projection(&entry(), &state).unwrap();

        assert_close(projection.qty_a_future, dec!(8.164965809), dec!(0.000000001));
        assert_close(projection.qty_b_future, dec!(1224.744871391), dec!(0.000000001));
        assert_eq!(projection.value_before_interest.round_dp(2), dec!(2449.49));
        assert_eq!(projection.value_a_held, dec!(1500));
        assert_eq!(projection.value_b_held, dec!(1000));
        assert_eq!(projection.value_if_held, dec!(2500));
        assert_eq!(projection.il_dollar.round_dp(2), dec!(50.51));
        assert_eq!(projection.il_percent.0.round_dp(2), dec!(2.02));

        // no days elapsed: no interest
        assert_eq!(projection.days, 0);
        assert!(projection.interest_dollar.is_zero());
        assert_eq!(projection.value_with_interest, projection.value_before_interest);
        assert_eq!(projection.diff_vs_holding, -projection.il_dollar);
    }

    #[test]
    fn test_matches_closed_form_il() {
        let state = ProjectionState::new(start()).with_future_prices(dec!(150), dec!(1));
        let projection = compute_projection(&entry(), &state).unwrap();

        // the A/B ratio moved from 100 to 150
        let expected = -il_ratio(dec!(1.5)).unwrap() * Decimal::ONE_HUNDRED;
        assert_close(projection.il_percent.0, expected, dec!(0.0000001));
    }

    #[test]
    fn test_no_price_move_has_no_loss() {
        let state = ProjectionState::new(start()).with_future_prices(dec!(100), dec!(1));
        let projection = compute_projection(&entry(), &state).unwrap();

        assert_close(projection.qty_a_future, dec!(10), dec!(0.000000001));
        assert_close(projection.qty_b_future, dec!(1000), dec!(0.000000001));
        assert_close(projection.il_dollar, Decimal::ZERO, dec!(0.000000001));
    }

    #[test]
    fn test_incomplete_inputs_yield_zero() {
        let only_a = ProjectionState {
            price_a_future: Some(dec!(150)),
            ..ProjectionState::new(start())
        };
        assert_eq!(
            compute_projection(&entry(), &only_a).unwrap(),
            ProjectionValuation::zero()
        );

        let zero_b = ProjectionState::new(start()).with_future_prices(dec!(150), Decimal::ZERO);
        assert_eq!(
            compute_projection(&entry(), &zero_b).unwrap(),
            ProjectionValuation::zero()
        );

        let no_position = EntryValuation::zero(start());
        let priced = ProjectionState::new(start()).with_future_prices(dec!(150), dec!(1));
        assert_eq!(
            compute_projection(&no_position, &priced).unwrap(),
            ProjectionValuation::zero()
        );
    }

    #[test]
    fn test_apr_interest_over_a_year() {
        let future = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let state = ProjectionState::new(future)
            .with_future_prices(dec!(100), dec!(1))
            .with_rate(dec!(10), RateMode::Apr);
        let projection = compute_projection(&entry(), &state).unwrap();

        assert_eq!(projection.days, 365);
        assert_close(projection.interest_dollar, dec!(200), dec!(0.0000001));
        assert_close(projection.interest_percent.0, dec!(10), dec!(0.0000001));
        assert_close(projection.value_with_interest, dec!(2200), dec!(0.0000001));
        assert_close(projection.diff_vs_holding, dec!(200), dec!(0.0000001));
    }

    #[test]
    fn test_apy_beats_apr() {
        let future = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let apr = ProjectionState::new(future)
            .with_future_prices(dec!(150), dec!(1))
            .with_rate(dec!(20), RateMode::Apr);
        let apy = ProjectionState {
            rate_mode: RateMode::Apy,
            ..apr.clone()
        };
        let apr = compute_projection(&entry(), &apr).unwrap();
        let apy = compute_projection(&entry(), &apy).unwrap();
        assert!(apy.interest_percent > apr.interest_percent);
        assert!(apy.value_with_interest > apr.value_with_interest);
    }

    #[test]
    fn test_future_date_before_start_is_invalid() {
        let past = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let state = ProjectionState::new(past).with_future_prices(dec!(150), dec!(1));
        let err = compute_projection(&entry(), &state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_negative_inputs_are_invalid() {
        let negative_price = ProjectionState::new(start()).with_future_prices(dec!(-1), dec!(1));
        assert_eq!(
            compute_projection(&entry(), &negative_price).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );

        let negative_rate = ProjectionState::new(start())
            .with_future_prices(dec!(150), dec!(1))
            .with_rate(dec!(-5), RateMode::Apr);
        assert_eq!(
            compute_projection(&entry(), &negative_rate).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_elapsed_days() {
        let end = NaiveDate::from_ymd_opt(2021, 1, 31).unwrap();
        assert_eq!(elapsed_days(start(), end).unwrap(), 30);
        assert_eq!(elapsed_days(start(), start()).unwrap(), 0);
        assert!(elapsed_days(end, start()).is_err());
    }

    #[test]
    fn test_held_value_overflow_is_an_error() {
        let entry =
            size_position(start(), Price::new(dec!(1)), dec!(1), Price::new(dec!(1))).unwrap();
        // each held half fits a Decimal, their sum does not
        let state = ProjectionState::new(start()).with_future_prices(
            Decimal::from_i128_with_scale(70_000_000_000_000_000_000_000_000_000, 0),
            Decimal::from_i128_with_scale(10_000_000_000_000_000_000_000_000_000, 0),
        );
        let err = compute_projection(&entry, &state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticDomain);
    }

    #[test]
    fn test_interest_percentage_overflow_is_an_error() {
        let entry =
            size_position(start(), Price::new(dec!(1)), dec!(0.01), Price::new(dec!(1))).unwrap();
        let ten_years = NaiveDate::from_ymd_opt(2031, 1, 1).unwrap();
        let state = ProjectionState::new(ten_years)
            .with_future_prices(dec!(1), dec!(1))
            .with_rate(
                Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0),
                RateMode::Apr,
            );
        let err = compute_projection(&entry, &state).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticDomain);
    }
}
