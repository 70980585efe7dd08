use crate::error::DomainError;
use crate::value_objects::price::Price;
use rust_decimal::{Decimal, MathematicalOps};

/// Calculates the constant product K = qty_a * qty_b
pub fn calculate_k(qty_a: Decimal, qty_b: Decimal) -> Result<Decimal, DomainError> {
    if qty_a < Decimal::ZERO || qty_b < Decimal::ZERO {
        return Err(DomainError::InvalidInput(
            "pool quantities cannot be negative".to_string(),
        ));
    }
    qty_a
        .checked_mul(qty_b)
        .ok_or_else(|| DomainError::overflow("constant product"))
}

/// Quantity of token B that matches the USD value of `qty_a` at entry.
///
/// formula: qty_b = price_a * qty_a / price_b
pub fn balance_quantity(
    price_a: Price,
    qty_a: Decimal,
    price_b: Price,
) -> Result<Decimal, DomainError> {
    if price_b.is_zero() {
        return Err(DomainError::DivisionByZero("entry price of token B"));
    }
    let value_a = price_a
        .value
        .checked_mul(qty_a)
        .ok_or_else(|| DomainError::overflow("token A value"))?;
    value_a
        .checked_div(price_b.value)
        .ok_or_else(|| DomainError::overflow("token B quantity"))
}

/// Quantities a constant-product pool holds once the market moves to the
/// given prices. returns (qty_a, qty_b)
///
/// With r = price_a / price_b:
/// qty_a = sqrt(k / r), qty_b = sqrt(k * r)
///
/// Only the ratio matters, so scaling both prices leaves the result unchanged.
pub fn rebalance(
    k: Decimal,
    price_a: Price,
    price_b: Price,
) -> Result<(Decimal, Decimal), DomainError> {
    if k < Decimal::ZERO {
        return Err(DomainError::ArithmeticDomain(format!(
            "negative pool invariant: {k}"
        )));
    }
    if price_b.is_zero() {
        return Err(DomainError::DivisionByZero("future price of token B"));
    }
    let ratio = price_a.ratio_to(price_b)?;
    if ratio.is_zero() {
        return Err(DomainError::DivisionByZero("future price ratio"));
    }

    let qty_a_squared = k
        .checked_div(ratio)
        .ok_or_else(|| DomainError::overflow("k / ratio"))?;
    let qty_b_squared = k
        .checked_mul(ratio)
        .ok_or_else(|| DomainError::overflow("k * ratio"))?;

    let qty_a = qty_a_squared
        .sqrt()
        .ok_or_else(|| DomainError::ArithmeticDomain("sqrt(k / ratio)".to_string()))?;
    let qty_b = qty_b_squared
        .sqrt()
        .ok_or_else(|| DomainError::ArithmeticDomain("sqrt(k * ratio)".to_string()))?;

    Ok((qty_a, qty_b))
}
