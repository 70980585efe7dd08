use crate::error::DomainError;
use crate::metrics::ImpermanentLoss;
use crate::value_objects::percentage::Percentage;
use crate::value_objects::price::Price;
use rust_decimal::{Decimal, MathematicalOps};

/// USD value of a two-token bundle: qty_a * price_a + qty_b * price_b
pub fn value_of(
    qty_a: Decimal,
    price_a: Price,
    qty_b: Decimal,
    price_b: Price,
) -> Result<Decimal, DomainError> {
    let value_a = qty_a
        .checked_mul(price_a.value)
        .ok_or_else(|| DomainError::overflow("token A value"))?;
    let value_b = qty_b
        .checked_mul(price_b.value)
        .ok_or_else(|| DomainError::overflow("token B value"))?;
    value_a
        .checked_add(value_b)
        .ok_or_else(|| DomainError::overflow("bundle value"))
}

/// Compares the pool value against the value of simply holding.
///
/// il_usd = value_if_held - value_in_pool
/// il_pct = il_usd / value_if_held * 100, or 0 when nothing was held
pub fn calculate_il(
    value_if_held: Decimal,
    value_in_pool: Decimal,
) -> Result<ImpermanentLoss, DomainError> {
    let absolute_loss_usd = value_if_held
        .checked_sub(value_in_pool)
        .ok_or_else(|| DomainError::overflow("impermanent loss"))?;
    let percentage_loss = if value_if_held.is_zero() {
        Percentage::ZERO
    } else {
        let fraction = absolute_loss_usd
            .checked_div(value_if_held)
            .ok_or_else(|| DomainError::overflow("impermanent loss ratio"))?;
        Percentage::from_fraction(fraction)?
    };
    Ok(ImpermanentLoss {
        absolute_loss_usd,
        percentage_loss,
    })
}

/// Closed-form impermanent loss for a constant product pool.
/// formula: 2 * sqrt(x) / (1 + x) - 1
///
/// # Arguments
///
/// * `price_ratio_change` - how much the A/B price ratio moved since entry
///   (future ratio / entry ratio)
///
/// # Returns
///
/// * `Decimal` - The impermanent loss as a negative fraction (e.g., -0.05 for 5% loss)
pub fn il_ratio(price_ratio_change: Decimal) -> Result<Decimal, DomainError> {
    if price_ratio_change < Decimal::ZERO {
        return Err(DomainError::InvalidInput(format!(
            "price ratio change cannot be negative: {price_ratio_change}"
        )));
    }
    let sqrt_ratio = price_ratio_change
        .sqrt()
        .ok_or_else(|| DomainError::ArithmeticDomain("sqrt(price ratio change)".to_string()))?;
    let denominator = Decimal::ONE
        .checked_add(price_ratio_change)
        .ok_or_else(|| DomainError::overflow("1 + price ratio change"))?;
    Decimal::TWO
        .checked_mul(sqrt_ratio)
        .and_then(|v| v.checked_div(denominator))
        .and_then(|v| v.checked_sub(Decimal::ONE))
        .ok_or_else(|| DomainError::overflow("closed-form impermanent loss"))
}
