use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// USD unit price of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub const ZERO: Self = Self {
        value: Decimal::ZERO,
    };

    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Builds a price, rejecting negative values.
    pub fn try_new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ZERO {
            return Err(DomainError::InvalidInput(format!(
                "price cannot be negative: {value}"
            )));
        }
        Ok(Self { value })
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Price of this token expressed in units of `other`.
    pub fn ratio_to(&self, other: Price) -> Result<Decimal, DomainError> {
        if other.is_zero() {
            return Err(DomainError::DivisionByZero("price ratio denominator"));
        }
        self.value
            .checked_div(other.value)
            .ok_or_else(|| DomainError::overflow("price ratio"))
    }

    /// Scales the price by a positive factor.
    pub fn scale(&self, factor: Decimal) -> Result<Self, DomainError> {
        self.value
            .checked_mul(factor)
            .map(Self::new)
            .ok_or_else(|| DomainError::overflow("price scaling"))
    }
}
